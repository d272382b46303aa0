//! Error types for talking to the events API.

use thiserror::Error;

/// Errors that can occur in API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API worker is not running")]
    WorkerStopped,
}

impl ApiError {
    /// True for a 401 that survived the refresh attempt.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
