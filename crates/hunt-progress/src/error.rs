//! Progress store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Invalid QR code: {0}")]
    InvalidCode(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for ProgressError {
    fn from(e: std::io::Error) -> Self {
        ProgressError::StorageUnavailable(e.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ProgressError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ProgressError::StorageUnavailable("storage operation timed out".into())
    }
}
