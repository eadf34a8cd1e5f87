//! Register, login and verification flows.

use smart_pantry_core::{Email, RegistrationForm, ValidationError};
use tracing::{info, instrument, warn};

use crate::auth::{AuthError, AuthProvider};
use crate::session::User;

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The new account. It is signed out again before this is returned.
    pub user: User,
    /// Whether the verification email went out.
    pub verification_sent: bool,
}

/// Account flows.
pub struct AccountService<'a, A> {
    auth: &'a A,
}

impl<'a, A: AuthProvider> AccountService<'a, A> {
    #[must_use]
    pub const fn new(auth: &'a A) -> Self {
        Self { auth }
    }

    /// Create an account, name it, send the verification email and sign
    /// out, so the first login happens after verification.
    ///
    /// A failure to set the name or send the email does not undo the
    /// account; it is logged and reported through [`Registration`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid, or the
    /// provider's error if sign-up fails.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<Registration, AuthError> {
        let valid = form.validate()?;
        let mut user = self.auth.sign_up(&valid.email, &valid.password).await?.user;

        match self.auth.update_display_name(&valid.display_name).await {
            Ok(()) => user.display_name = Some(valid.display_name),
            Err(e) => warn!(error = %e, "Failed to set display name"),
        }

        let verification_sent = match self.auth.send_verification_email().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to send verification email");
                false
            }
        };

        self.auth.sign_out().await;
        info!(uid = %user.id, verification_sent, "Account registered");

        Ok(Registration {
            user,
            verification_sent,
        })
    }

    /// Sign in. Unverified accounts are signed straight back out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for blank input,
    /// `AuthError::InvalidEmail` for a malformed address,
    /// `AuthError::EmailNotVerified` if the address is not verified, or the
    /// provider's error.
    #[instrument(skip(self, email, password), fields(email = %email.trim()))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = parse_credentials(email, password)?;
        let session = self.auth.sign_in(&email, password).await?;

        if !session.user.email_verified {
            self.auth.sign_out().await;
            return Err(AuthError::EmailNotVerified);
        }

        info!(uid = %session.user.id, "Logged in");
        Ok(session.user)
    }

    /// Sign in just long enough to send another verification email.
    ///
    /// # Errors
    ///
    /// Returns the same input errors as [`Self::login`], or the provider's
    /// error.
    #[instrument(skip(self, email, password), fields(email = %email.trim()))]
    pub async fn resend_verification(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = parse_credentials(email, password)?;
        self.auth.sign_in(&email, password).await?;
        let sent = self.auth.send_verification_email().await;
        self.auth.sign_out().await;
        sent
    }

    pub async fn logout(&self) {
        self.auth.sign_out().await;
    }

    /// Name to greet the signed-in user with.
    pub async fn greeting(&self) -> Option<String> {
        self.auth
            .current_user()
            .await
            .map(|user| user.greeting_name().to_string())
    }
}

fn parse_credentials(email: &str, password: &str) -> Result<Email, AuthError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Blank("email").into());
    }
    if password.is_empty() {
        return Err(ValidationError::Blank("password").into());
    }
    Ok(Email::parse(email)?)
}
