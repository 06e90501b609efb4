//! Error types for blockscope

use thiserror::Error;

/// Failures while resolving node credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no RPC credentials: set RPCUSER and RPCPASSWORD or provide {path}")]
    MissingCredentials { path: String },

    #[error("cannot read config file {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    MalformedFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the node over JSON-RPC.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// A hash or txid supplied by the caller is not 64 hex characters.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC protocol error: {0}")]
    Protocol(String),
}

/// Failures talking to the hosted explorer API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("explorer unreachable: {0}")]
    Unreachable(String),

    #[error("explorer returned HTTP status {0}")]
    NonSuccessStatus(u16),
}

/// The backend error preserved inside [`QueryError::BackendFailure`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error(transparent)]
    Rpc(RpcError),

    #[error(transparent)]
    Api(ApiError),
}

/// Errors returned to the presentation layer by the query service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend failure: {0}")]
    BackendFailure(#[source] BackendError),
}

impl From<RpcError> for QueryError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidIdentifier(msg) => QueryError::InvalidInput(msg),
            other => QueryError::BackendFailure(BackendError::Rpc(other)),
        }
    }
}

impl From<ApiError> for QueryError {
    fn from(err: ApiError) -> Self {
        QueryError::BackendFailure(BackendError::Api(err))
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, QueryError>;
