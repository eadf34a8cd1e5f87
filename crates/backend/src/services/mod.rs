//! Application flows built on the auth and store seams.
//!
//! Services borrow their providers, so one provider pair can back any number
//! of short-lived services.

mod account;
mod pantry;

pub use account::{AccountService, Registration};
pub use pantry::{PantryError, PantryService};
