//! Authentication provider seam.
//!
//! An [`AuthProvider`] owns the signed-in [`Session`]. Implementations:
//!
//! - [`FirebaseAuth`] - Firebase Identity Toolkit over REST
//! - [`MemoryAuth`](crate::memory::MemoryAuth) - in-process accounts

mod error;
mod firebase;

pub use error::AuthError;
pub use firebase::FirebaseAuth;

use std::future::Future;

use smart_pantry_core::Email;

use crate::session::{Session, User};

/// Email/password identity provider.
///
/// On success `sign_up` and `sign_in` leave the returned session installed
/// as the current one.
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in.
    fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Sign in with existing credentials.
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Drop the current session. Signing out while signed out is a no-op.
    fn sign_out(&self) -> impl Future<Output = ()> + Send;

    /// The signed-in user, if any.
    fn current_user(&self) -> impl Future<Output = Option<User>> + Send;

    /// Send a verification link to the signed-in user's address.
    fn send_verification_email(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Set the signed-in user's display name.
    fn update_display_name(
        &self,
        display_name: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}
