//! Error types for the context updater

use thiserror::Error;

/// Result type for context updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for context updater operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Source fetching error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot persistence or validation error
    #[error("Write error: {0}")]
    Write(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
