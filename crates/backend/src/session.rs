//! Signed-in session state shared between the auth provider and the record
//! store.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use smart_pantry_core::{Email, OwnerId};
use tokio::sync::RwLock;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: OwnerId,
    pub email: Email,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

impl User {
    /// Greeting shown after login when no display name is set.
    pub const DEFAULT_GREETING: &'static str = "Welcome";

    /// Display name, or [`Self::DEFAULT_GREETING`].
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(Self::DEFAULT_GREETING)
    }
}

/// An authenticated session: the user plus the bearer token backend calls
/// are made with.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub id_token: SecretString,
}

/// Cloneable handle to the current session, if any.
///
/// The auth provider writes it on sign-in and clears it on sign-out; the
/// record store reads the ID token from it for every request.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn id_token(&self) -> Option<SecretString> {
        self.inner.read().await.as_ref().map(|s| s.id_token.clone())
    }

    /// Install a new session, replacing any previous one.
    pub async fn replace(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    /// Remove the current session and return it.
    pub async fn clear(&self) -> Option<Session> {
        self.inner.write().await.take()
    }

    /// Mutate the signed-in user in place. Returns `false` when nobody is
    /// signed in.
    pub async fn update_user(&self, update: impl FnOnce(&mut User) + Send) -> bool {
        match self.inner.write().await.as_mut() {
            Some(session) => {
                update(&mut session.user);
                true
            }
            None => false,
        }
    }
}
