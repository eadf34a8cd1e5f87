//! Firebase Identity Toolkit client.
//!
//! Speaks the `accounts:*` REST endpoints with the project's web API key.
//! The ID token returned on sign-in is kept in the shared [`SessionHandle`]
//! so the record store can authenticate with it.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use smart_pantry_core::{Email, OwnerId};
use tracing::{debug, instrument};
use url::Url;

use super::{AuthError, AuthProvider};
use crate::config::FirebaseConfig;
use crate::session::{Session, SessionHandle, User};

// =============================================================================
// FirebaseAuth
// =============================================================================

/// [`AuthProvider`] backed by Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseAuth {
    inner: Arc<FirebaseAuthInner>,
}

struct FirebaseAuthInner {
    client: reqwest::Client,
    auth_url: Url,
    api_key: SecretString,
    session: SessionHandle,
}

impl FirebaseAuth {
    /// Create a client with a fresh, empty session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, AuthError> {
        Self::with_session(config, SessionHandle::new())
    }

    /// Create a client that writes into an existing session handle.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_session(config: &FirebaseConfig, session: SessionHandle) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(FirebaseAuthInner {
                client,
                auth_url: config.auth_url.clone(),
                api_key: config.api_key.clone(),
                session,
            }),
        })
    }

    /// The session handle this client signs in to.
    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.inner.session.clone()
    }

    /// `{auth_url}/accounts:{method}?key={api_key}`
    fn endpoint(&self, method: &str) -> Result<Url, AuthError> {
        let raw = format!(
            "{}/accounts:{method}",
            self.inner.auth_url.as_str().trim_end_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| AuthError::Parse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    /// POST a JSON body to an `accounts:*` endpoint.
    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<R, AuthError> {
        let url = self.endpoint(method)?;
        debug!(method, "Identity Toolkit request");

        let response = self.inner.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Parse(e.to_string()))
    }

    async fn lookup(&self, id_token: &str) -> Result<AccountInfo, AuthError> {
        let body = serde_json::json!({ "idToken": id_token });
        let response: LookupResponse = self.call("lookup", &body).await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Parse("lookup returned no users".to_string()))
    }

    async fn require_token(&self) -> Result<SecretString, AuthError> {
        self.inner
            .session
            .id_token()
            .await
            .ok_or(AuthError::NotSignedIn)
    }

    async fn install(&self, user: User, id_token: String) -> Session {
        let session = Session {
            user,
            id_token: SecretString::from(id_token),
        };
        self.inner.session.replace(session.clone()).await;
        session
    }
}

impl AuthProvider for FirebaseAuth {
    #[instrument(skip(self, email, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });
        let token: TokenResponse = self.call("signUp", &body).await?;

        let user = User {
            id: OwnerId::new(token.local_id),
            email: email.clone(),
            display_name: token.display_name.filter(|n| !n.is_empty()),
            email_verified: false,
        };
        debug!(uid = %user.id, "Account created");
        Ok(self.install(user, token.id_token).await)
    }

    #[instrument(skip(self, email, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });
        let token: TokenResponse = self.call("signInWithPassword", &body).await?;
        let account = self.lookup(&token.id_token).await?;

        let user = User {
            id: OwnerId::new(account.local_id),
            email: email.clone(),
            display_name: account.display_name.filter(|n| !n.is_empty()),
            email_verified: account.email_verified,
        };
        debug!(uid = %user.id, verified = user.email_verified, "Signed in");
        Ok(self.install(user, token.id_token).await)
    }

    async fn sign_out(&self) {
        if let Some(session) = self.inner.session.clear().await {
            debug!(uid = %session.user.id, "Signed out");
        }
    }

    async fn current_user(&self) -> Option<User> {
        self.inner.session.user().await
    }

    #[instrument(skip(self))]
    async fn send_verification_email(&self) -> Result<(), AuthError> {
        let id_token = self.require_token().await?;
        let body = serde_json::json!({
            "requestType": "VERIFY_EMAIL",
            "idToken": id_token.expose_secret(),
        });
        let _: IgnoredAny = self.call("sendOobCode", &body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let id_token = self.require_token().await?;
        let body = serde_json::json!({
            "idToken": id_token.expose_secret(),
            "displayName": display_name,
            "returnSecureToken": false,
        });
        let _: IgnoredAny = self.call("update", &body).await?;

        let name = display_name.to_string();
        self.inner
            .session
            .update_user(move |user| user.display_name = Some(name))
            .await;
        Ok(())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success response to [`AuthError::Provider`], keeping only the
/// provider's message (for example `EMAIL_EXISTS`).
fn provider_error(status: u16, body: &str) -> AuthError {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                AuthError::Provider(format!("HTTP {status}"))
            } else {
                AuthError::Provider(trimmed.to_string())
            }
        },
        |envelope| AuthError::Provider(envelope.error.message),
    )
}
