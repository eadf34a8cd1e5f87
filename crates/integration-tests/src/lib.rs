//! Integration tests for Smart Pantry.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory flows
//! cargo test -p smart-pantry-integration-tests
//!
//! # Live Firebase project (reads FIREBASE_* and PANTRY_* from the environment)
//! cargo test -p smart-pantry-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `account_flow` - Register, verify, login
//! - `pantry_flow` - Add, delete, list and watch across users
//! - `firebase_live` - The same flows against a real project

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use smart_pantry_backend::{
    AccountService, AuthError, MemoryAuth, MemoryRecordStore, PantryService, Snapshot,
    Subscription, User,
};
use smart_pantry_core::{Category, Email, ExpiryDate, ItemForm, RegistrationForm};

/// Default password for test accounts. Meets every strength rule.
pub const PASSWORD: &str = "Kiler1!";

/// How long to wait for a snapshot before failing a test.
pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);

/// One user's view of a shared in-memory backend.
pub struct TestContext {
    pub auth: MemoryAuth,
    pub store: MemoryRecordStore,
}

impl TestContext {
    /// A fresh backend with no accounts and no records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth: MemoryAuth::new(),
            store: MemoryRecordStore::new(),
        }
    }

    /// Another user on the same record store, with separate accounts.
    #[must_use]
    pub fn second_user(&self) -> Self {
        Self {
            auth: MemoryAuth::new(),
            store: self.store.clone(),
        }
    }

    #[must_use]
    pub const fn accounts(&self) -> AccountService<'_, MemoryAuth> {
        AccountService::new(&self.auth)
    }

    #[must_use]
    pub const fn pantry(&self) -> PantryService<'_, MemoryAuth, MemoryRecordStore> {
        PantryService::new(&self.auth, &self.store)
    }

    /// Register `email`, verify it and log in.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn signed_in_as(&self, name: &str, email: &str) -> Result<User, AuthError> {
        self.accounts().register(&registration(name, email)).await?;
        self.auth.verify_email(&Email::parse(email)?).await;
        self.accounts().login(email, PASSWORD).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn registration(name: &str, email: &str) -> RegistrationForm {
    RegistrationForm {
        display_name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
    }
}

#[must_use]
pub fn item(name: &str, date: &str, category: Category) -> ItemForm {
    ItemForm {
        name: name.to_string(),
        expiry_date: ExpiryDate::new(date),
        category,
    }
}

/// Fixed "now" used across tests: 14 June 2025, mid-morning UTC.
#[must_use]
pub fn june_14() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Next snapshot, or `None` if none arrives within [`SNAPSHOT_TIMEOUT`] or
/// the feed ended.
pub async fn next_snapshot(subscription: &mut Subscription) -> Option<Snapshot> {
    tokio::time::timeout(SNAPSHOT_TIMEOUT, subscription.next())
        .await
        .ok()
        .flatten()
}
