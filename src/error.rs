use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving credentials or refreshing a token
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed caller input (bad scope shape, missing credential fields)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An explicitly named credential file could not be read
    #[error("Unable to read credential file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Environment or well-known file is configured but unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token endpoint rejected the request (4xx)
    #[error("Token endpoint rejected credentials ({status}): {body}")]
    ClientAuth { status: StatusCode, body: String },

    /// Token endpoint failed (5xx)
    #[error("Token endpoint server error ({status}): {body}")]
    ServerAuth { status: StatusCode, body: String },

    /// Response body could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP request error (preserves reqwest::Error for timeout detection)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Whether the injected transport gave up waiting for the endpoint
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::HttpRequest(e) if e.is_timeout())
    }

    /// Determine if a caller may reasonably retry the same call
    ///
    /// ## Retryable (returns true):
    /// - HTTP 5xx from the token endpoint
    /// - Connection failures and timeouts
    ///
    /// ## NOT retryable (returns false):
    /// - HTTP 4xx (revoked or malformed refresh token)
    /// - Bad input, unreadable files, undecodable responses
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServerAuth { .. } => true,
            Self::HttpRequest(e) => e.is_connect() || e.is_timeout(),
            Self::InvalidArgument(_)
            | Self::FileAccess { .. }
            | Self::Configuration(_)
            | Self::ClientAuth { .. }
            | Self::Protocol(_) => false,
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("JSON error: {}", err))
    }
}
