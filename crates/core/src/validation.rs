//! Form validation for the register and add-item flows.

use crate::types::{
    Category, Email, EmailError, ExpiryDate, NewPantryRecord, OwnerId, PasswordError,
    validate_password,
};

/// Errors raised by form validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace.
    #[error("{0} cannot be blank")]
    Blank(&'static str),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("weak password: {0}")]
    WeakPassword(#[from] PasswordError),
}

/// Raw register form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// A register form that passed validation, with trimmed values.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub display_name: String,
    pub email: Email,
    pub password: String,
}

impl RegistrationForm {
    /// Validate the form. Name, email and password are trimmed first.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` for an empty field, otherwise the
    /// first email or password rule that fails.
    pub fn validate(&self) -> Result<ValidRegistration, ValidationError> {
        let display_name = non_blank(&self.display_name, "name")?;
        non_blank(&self.email, "email")?;
        let password = non_blank(&self.password, "password")?;

        let email = Email::parse(&self.email)?;
        validate_password(password)?;

        Ok(ValidRegistration {
            display_name: display_name.to_owned(),
            email,
            password: password.to_owned(),
        })
    }
}

/// Raw add-item form input.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: String,
    pub expiry_date: ExpiryDate,
    pub category: Category,
}

impl ItemForm {
    /// Validate the form and build a record owned by `owner`.
    ///
    /// The date is only checked for blankness; a malformed date is stored
    /// as-is and ranks last.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` if the name or date is blank.
    pub fn into_record(self, owner: OwnerId) -> Result<NewPantryRecord, ValidationError> {
        non_blank(&self.name, "name")?;
        if self.expiry_date.is_blank() {
            return Err(ValidationError::Blank("expiry date"));
        }

        Ok(NewPantryRecord {
            name: self.name,
            expiry_date: self.expiry_date,
            category: self.category,
            owner_id: owner,
        })
    }
}

fn non_blank<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(trimmed)
    }
}
