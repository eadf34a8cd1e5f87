//! Core types for Smart Pantry.
//!
//! This module provides type-safe wrappers for the pantry domain.

pub mod category;
pub mod email;
pub mod expiry;
pub mod id;
pub mod password;
pub mod record;
pub mod status;

pub use category::{Category, CategoryFilter};
pub use email::{Email, EmailError};
pub use expiry::{ExpiryDate, UNPARSEABLE_DAYS, days_until};
pub use id::*;
pub use password::{MIN_PASSWORD_LENGTH, PasswordError, validate_password};
pub use record::{NewPantryRecord, PantryRecord};
pub use status::{ExpiryStatus, SOON_THRESHOLD_DAYS, Urgency, status_label, urgency};
