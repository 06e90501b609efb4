//! Hosted block-explorer client for address history.
//!
//! The explorer's response schema belongs to a third party, so the body is
//! handed back as-is and decoding is left to the presentation layer.

use crate::config::Config;
use crate::error::ApiError;
use crate::source::AddressSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Placeholder substituted with the address in the endpoint template.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Explorer client. The endpoint template is split at the placeholder once,
/// and every address is inserted as exactly one percent-encoded path segment.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    base: Url,
    suffix: String,
}

impl ExplorerClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_template(&config.explorer_url, config.timeout_secs)
    }

    /// Build a client for an arbitrary endpoint template containing `{address}`
    /// in its path.
    pub fn with_template(url_template: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let invalid = |reason: String| {
            ApiError::Unreachable(format!("invalid explorer URL '{}': {}", url_template, reason))
        };

        let (prefix, suffix) = url_template
            .split_once(ADDRESS_PLACEHOLDER)
            .ok_or_else(|| invalid(format!("missing {} placeholder", ADDRESS_PLACEHOLDER)))?;
        let base = Url::parse(prefix).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || base.query().is_some() || base.fragment().is_some() {
            return Err(invalid(format!(
                "{} must be part of the path",
                ADDRESS_PLACEHOLDER
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            suffix: suffix.to_string(),
        })
    }

    /// Endpoint for one address. Reserved characters in the address (`/`,
    /// `?`, `#`, `%`) are percent-encoded and never change the URL's shape.
    pub fn endpoint_for(&self, address: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Unreachable(format!("invalid explorer URL '{}'", self.base)))?
            .pop_if_empty()
            .push(address);

        Url::parse(&format!("{}{}", url, self.suffix))
            .map_err(|e| ApiError::Unreachable(format!("invalid explorer URL: {}", e)))
    }
}

#[async_trait]
impl AddressSource for ExplorerClient {
    async fn address_history(&self, address: &str) -> Result<String, ApiError> {
        let url = self.endpoint_for(address)?;
        tracing::debug!(%url, "fetching address history");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%url, status = status.as_u16(), "explorer request failed");
            return Err(ApiError::NonSuccessStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Unreachable(format!("failed reading body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXPLORER_URL;

    #[test]
    fn test_endpoint_templating() {
        let client = ExplorerClient::with_template(DEFAULT_EXPLORER_URL, 10).unwrap();
        assert_eq!(
            client
                .endpoint_for("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
                .unwrap()
                .as_str(),
            "https://api.blockcypher.com/v1/btc/main/addrs/1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa/full"
        );
    }

    #[test]
    fn test_address_stays_one_path_segment() {
        let client = ExplorerClient::with_template(DEFAULT_EXPLORER_URL, 10).unwrap();

        let url = client.endpoint_for("1abc/../x").unwrap();
        assert_eq!(url.host_str(), Some("api.blockcypher.com"));
        assert_eq!(url.path(), "/v1/btc/main/addrs/1abc%2F..%2Fx/full");

        let url = client.endpoint_for("1abc?token=x#top").unwrap();
        assert_eq!(url.path(), "/v1/btc/main/addrs/1abc%3Ftoken=x%23top/full");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = client.endpoint_for("..").unwrap();
        assert!(url.path().starts_with("/v1/btc/main/addrs/"));
    }

    #[test]
    fn test_template_query_is_kept() {
        let client =
            ExplorerClient::with_template("http://127.0.0.1:9000/a/{address}?limit=50", 10)
                .unwrap();
        let url = client.endpoint_for("bc1qxyz").unwrap();
        assert_eq!(url.path(), "/a/bc1qxyz");
        assert_eq!(url.query(), Some("limit=50"));

        let client = ExplorerClient::with_template("http://127.0.0.1:9000/{address}", 10).unwrap();
        assert_eq!(client.endpoint_for("abc").unwrap().path(), "/abc");
    }

    #[test]
    fn test_invalid_templates_are_rejected() {
        for template in [
            "https://api.example.com/addrs/full",
            "not a url/{address}",
            "https://api.example.com/addrs?a={address}",
        ] {
            let err = ExplorerClient::with_template(template, 10).unwrap_err();
            assert!(matches!(err, ApiError::Unreachable(_)), "{}", template);
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let template = format!("http://127.0.0.1:{}/{{address}}", port);
        let client = ExplorerClient::with_template(&template, 2).unwrap();
        let err = client.address_history("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)));
    }
}
