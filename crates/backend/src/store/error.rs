//! Record store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a store response.
    #[error("parse error: {0}")]
    Parse(String),

    /// No signed-in session to authenticate with.
    #[error("not signed in")]
    Unauthenticated,
}
