//! Error types for the fetcher module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client error (connect, timeout, redirect cap, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Http(e) => CrateError::Http(e),
            FetchError::Json(e) => CrateError::Json(e),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}
