//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Register form failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] smart_pantry_core::ValidationError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] smart_pantry_core::EmailError),

    /// Credentials were accepted but the address is not verified yet.
    #[error("email address is not verified; check your inbox for the verification link")]
    EmailNotVerified,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The provider rejected the request. Carries its message verbatim.
    #[error("{0}")]
    Provider(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}
