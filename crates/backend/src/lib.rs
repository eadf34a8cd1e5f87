//! Smart Pantry Backend.
//!
//! Everything that talks to the outside world lives here:
//!
//! - [`auth`] - The [`AuthProvider`](auth::AuthProvider) seam and its Firebase
//!   Identity Toolkit implementation
//! - [`store`] - The [`RecordStore`](store::RecordStore) seam, snapshot
//!   subscriptions and the Firestore implementation
//! - [`memory`] - In-process implementations of both seams
//! - [`services`] - Register/login and add/delete/watch flows
//! - [`config`] - Environment-based configuration
//!
//! # Architecture
//!
//! The backend (Firebase) is the source of truth. There is no local cache:
//! every list view is rebuilt from the latest full snapshot a subscription
//! delivers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod memory;
pub mod services;
pub mod session;
pub mod store;

pub use auth::{AuthError, AuthProvider, FirebaseAuth};
pub use config::{BackendConfig, ConfigError, FirebaseConfig};
pub use memory::{MemoryAuth, MemoryRecordStore};
pub use services::{AccountService, PantryError, PantryService, Registration};
pub use session::{Session, SessionHandle, User};
pub use store::{FirestoreStore, RecordStore, Snapshot, StoreError, Subscription};
