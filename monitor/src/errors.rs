//! Error types for the deploy monitor

use thiserror::Error;

/// Main error type for the deploy monitor
#[derive(Error, Debug)]
pub enum DeploysError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Credential decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

impl DeploysError {
    /// Whether the error means the cycle never reached the platform because
    /// credentials were missing or undecodable.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            DeploysError::CredentialUnavailable(_) | DeploysError::DecodeError(_)
        )
    }
}
