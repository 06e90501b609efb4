//! Configuration management for blockscope
//!
//! Node credentials come from the environment first and fall back to a JSON
//! file in the working directory. The resolved [`Config`] is immutable.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub const ENV_RPC_USER: &str = "RPCUSER";
pub const ENV_RPC_PASSWORD: &str = "RPCPASSWORD";
pub const ENV_RPC_HOST: &str = "RPCHOST";
pub const ENV_RPC_PORT: &str = "RPCPORT";

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_RPC_HOST: &str = "localhost";
pub const DEFAULT_RPC_PORT: &str = "8332";
pub const DEFAULT_EXPLORER_URL: &str =
    "https://api.blockcypher.com/v1/btc/main/addrs/{address}/full";

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "rpcuser")]
    pub rpc_user: String,
    #[serde(rename = "rpcpassword")]
    pub rpc_password: String,
    #[serde(rename = "rpchost")]
    pub rpc_host: String,
    #[serde(rename = "rpcport")]
    pub rpc_port: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
}

impl Config {
    /// Base URL of the node's JSON-RPC endpoint.
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/", self.rpc_host, self.rpc_port)
    }

    fn apply_defaults(mut self) -> Self {
        if self.rpc_host.is_empty() {
            self.rpc_host = DEFAULT_RPC_HOST.to_string();
        }
        if self.rpc_port.is_empty() {
            self.rpc_port = DEFAULT_RPC_PORT.to_string();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout();
        }
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_user", &self.rpc_user)
            .field("rpc_password", &"<redacted>")
            .field("rpc_host", &self.rpc_host)
            .field("rpc_port", &self.rpc_port)
            .field("timeout_secs", &self.timeout_secs)
            .field("explorer_url", &self.explorer_url)
            .finish()
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

/// Resolves node credentials from the environment or the config file.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    path: PathBuf,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl ConfigResolver {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve using the process environment.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve_with<F>(&self, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).unwrap_or_default();

        let user = var(ENV_RPC_USER);
        let password = var(ENV_RPC_PASSWORD);
        if !user.is_empty() && !password.is_empty() {
            tracing::debug!("using RPC credentials from environment");
            return Ok(Config {
                rpc_user: user,
                rpc_password: password,
                rpc_host: var(ENV_RPC_HOST),
                rpc_port: var(ENV_RPC_PORT),
                timeout_secs: default_timeout(),
                explorer_url: default_explorer_url(),
            }
            .apply_defaults());
        }

        self.load_file()
    }

    fn load_file(&self) -> Result<Config, ConfigError> {
        let path = self.path.display().to_string();
        tracing::debug!(path = %path, "reading RPC credentials from config file");

        let content = fs::read_to_string(&self.path).map_err(|source| {
            ConfigError::FileUnreadable {
                path: path.clone(),
                source,
            }
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| {
            ConfigError::MalformedFile {
                path: path.clone(),
                source,
            }
        })?;

        if config.rpc_user.is_empty() || config.rpc_password.is_empty() {
            return Err(ConfigError::MissingCredentials { path });
        }

        Ok(config.apply_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_credentials_with_defaults() {
        let resolver = ConfigResolver::with_path("/nonexistent/config.json");
        let config = resolver
            .resolve_with(env_of(&[(ENV_RPC_USER, "alice"), (ENV_RPC_PASSWORD, "secret")]))
            .unwrap();
        assert_eq!(config.rpc_user, "alice");
        assert_eq!(config.rpc_password, "secret");
        assert_eq!(config.rpc_host, "localhost");
        assert_eq!(config.rpc_port, "8332");
        assert_eq!(config.rpc_url(), "http://localhost:8332/");
    }

    #[test]
    fn test_env_host_and_port_override() {
        let resolver = ConfigResolver::with_path("/nonexistent/config.json");
        let config = resolver
            .resolve_with(env_of(&[
                (ENV_RPC_USER, "alice"),
                (ENV_RPC_PASSWORD, "secret"),
                (ENV_RPC_HOST, "10.0.0.5"),
                (ENV_RPC_PORT, "18332"),
            ]))
            .unwrap();
        assert_eq!(config.rpc_url(), "http://10.0.0.5:18332/");
    }

    #[test]
    fn test_partial_env_falls_back_to_file() {
        let file = write_config(
            r#"{"rpcuser":"bob","rpcpassword":"pw","rpchost":"node","rpcport":"8332"}"#,
        );
        let resolver = ConfigResolver::with_path(file.path());
        let config = resolver
            .resolve_with(env_of(&[(ENV_RPC_USER, "alice")]))
            .unwrap();
        assert_eq!(config.rpc_user, "bob");
        assert_eq!(config.rpc_host, "node");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.explorer_url, DEFAULT_EXPLORER_URL);
    }

    #[test]
    fn test_file_optional_fields() {
        let file = write_config(
            r#"{"rpcuser":"bob","rpcpassword":"pw","rpchost":"","rpcport":"",
                "timeout_secs":5,"explorer_url":"http://127.0.0.1:9000/{address}"}"#,
        );
        let config = ConfigResolver::with_path(file.path())
            .resolve_with(env_of(&[]))
            .unwrap();
        assert_eq!(config.rpc_host, "localhost");
        assert_eq!(config.rpc_port, "8332");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.explorer_url, "http://127.0.0.1:9000/{address}");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigResolver::with_path(dir.path().join("config.json"))
            .resolve_with(env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileUnreadable { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("rpcuser = \"toml is not json\"");
        let err = ConfigResolver::with_path(file.path())
            .resolve_with(env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFile { .. }));

        let file = write_config(r#"{"rpcuser":"bob","rpcpassword":"pw"}"#);
        let err = ConfigResolver::with_path(file.path())
            .resolve_with(env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFile { .. }));
    }

    #[test]
    fn test_empty_credentials_in_file() {
        let file = write_config(
            r#"{"rpcuser":"","rpcpassword":"","rpchost":"localhost","rpcport":"8332"}"#,
        );
        let err = ConfigResolver::with_path(file.path())
            .resolve_with(env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConfigResolver::default()
            .resolve_with(env_of(&[(ENV_RPC_USER, "alice"), (ENV_RPC_PASSWORD, "hunter2")]))
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
