//! Client-side password strength check for the register form.
//!
//! The auth provider applies its own rules on top; this check only decides
//! whether the form may be submitted.

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a password is rejected, in the order they are checked.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password cannot be empty")]
    Empty,
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("password must contain at least one digit")]
    MissingDigit,
    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Check a password against the strength rules.
///
/// Only the first failing rule is reported.
///
/// # Errors
///
/// Returns the first [`PasswordError`] the password violates.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if password.chars().all(char::is_alphanumeric) {
        return Err(PasswordError::MissingSpecial);
    }
    Ok(())
}
