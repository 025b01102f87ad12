//! Error types (scrac-client)

use thiserror::Error;

/// scrac-client error type
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Signal CLI REST API error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SignalError>;
