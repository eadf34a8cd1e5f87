//! Account email addresses.
//!
//! The login and register forms trim what the user typed and hand it to the
//! auth provider. [`Email`] performs the same trim plus a structural check so
//! obviously broken input is rejected before any network call. Whether the
//! address exists or is deliverable is up to the provider.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string is not a usable [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be blank")]
    Blank,
    #[error("email is {len} characters long, at most {max} are allowed")]
    TooLong { len: usize, max: usize },
    #[error("email cannot contain spaces")]
    Whitespace,
    #[error("email must contain an @")]
    MissingAt,
    #[error("email must contain only one @")]
    MultipleAt,
    #[error("email needs a name before the @")]
    MissingLocalPart,
    #[error("email needs a domain after the @")]
    MissingDomain,
}

/// A trimmed, structurally valid email address.
///
/// Comparison is exact; use [`Email::account_key`] where addresses must
/// match regardless of case, as the auth provider does.
///
/// ```
/// use smart_pantry_core::{Email, EmailError};
///
/// let email = Email::parse("  Cook@Example.com ").unwrap();
/// assert_eq!(email.as_str(), "Cook@Example.com");
/// assert_eq!(email.domain(), "Example.com");
/// assert_eq!(email.account_key(), "cook@example.com");
///
/// assert_eq!(Email::parse("cook.example.com"), Err(EmailError::MissingAt));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    address: String,
    at: usize,
}

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Trim and check `input`.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] that applies, checked in declaration
    /// order.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let address = input.trim();
        if address.is_empty() {
            return Err(EmailError::Blank);
        }

        let len = address.chars().count();
        if len > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                len,
                max: Self::MAX_LENGTH,
            });
        }
        if address.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let at = address.find('@').ok_or(EmailError::MissingAt)?;
        if address.rfind('@') != Some(at) {
            return Err(EmailError::MultipleAt);
        }
        if at == 0 {
            return Err(EmailError::MissingLocalPart);
        }
        if at + 1 == address.len() {
            return Err(EmailError::MissingDomain);
        }

        Ok(Self {
            address: address.to_owned(),
            at,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// The part before the @.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address.get(..self.at).unwrap_or_default()
    }

    /// The part after the @.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.address.get(self.at + 1..).unwrap_or_default()
    }

    /// Lowercased address, for case-insensitive account lookup.
    #[must_use]
    pub fn account_key(&self) -> String {
        self.address.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.address)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.address
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for input in [
            "cook@example.com",
            "furkan.k+kiler@mail.example.com.tr",
            "a@b",
        ] {
            assert!(Email::parse(input).is_ok(), "{input}");
        }
    }

    #[test]
    fn test_input_is_trimmed() {
        let email = Email::parse("\tcook@example.com \n").unwrap();
        assert_eq!(email.as_str(), "cook@example.com");
        assert_eq!(email.local_part(), "cook");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_rejections_in_order() {
        assert_eq!(Email::parse(" \t "), Err(EmailError::Blank));
        assert_eq!(Email::parse("cook @example.com"), Err(EmailError::Whitespace));
        assert_eq!(Email::parse("cook.example.com"), Err(EmailError::MissingAt));
        assert_eq!(Email::parse("cook@@example.com"), Err(EmailError::MultipleAt));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::MissingLocalPart));
        assert_eq!(Email::parse("cook@"), Err(EmailError::MissingDomain));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let domain = "ö".repeat(Email::MAX_LENGTH - 2);
        assert!(Email::parse(&format!("a@{domain}")).is_ok());
        assert_eq!(
            Email::parse(&format!("ab@{domain}")),
            Err(EmailError::TooLong {
                len: Email::MAX_LENGTH + 1,
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_account_key_ignores_case() {
        let upper = Email::parse("COOK@Example.COM").unwrap();
        let lower = Email::parse("cook@example.com").unwrap();
        assert_ne!(upper, lower);
        assert_eq!(upper.account_key(), lower.account_key());
    }

    #[test]
    fn test_deserialize_validates() {
        let email: Email = serde_json::from_str(r#"" cook@example.com""#).unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""cook@example.com""#);
        assert!(serde_json::from_str::<Email>(r#""not-an-email""#).is_err());
    }
}
