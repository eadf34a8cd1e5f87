//! Smart Pantry Core - Pure domain library.
//!
//! This crate provides the domain logic shared by every Smart Pantry component:
//! - `backend` - Auth provider and record store seams plus the account and pantry services
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no clock
//! reads, no HTTP clients. Every time-dependent operation takes "now" as an
//! argument so it stays testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, categories, expiry dates and records
//! - [`ranking`] - Filtering and expiry ordering of a record snapshot
//! - [`list`] - Explicit list-screen state built on top of [`ranking`]
//! - [`validation`] - Register and add-item form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod list;
pub mod ranking;
pub mod types;
pub mod validation;

pub use list::{ListEntry, PantryList};
pub use ranking::rank;
pub use types::*;
pub use validation::{ItemForm, RegistrationForm, ValidRegistration, ValidationError};
