//! Command implementations.

pub mod account;
pub mod items;

use std::io::{self, Write};

use clap::Args;
use smart_pantry_backend::{
    AccountService, AuthError, BackendConfig, FirebaseAuth, FirestoreStore, User,
};
use smart_pantry_core::CategoryFilter;
use thiserror::Error;

/// Errors raised by the CLI itself, before any backend call.
#[derive(Debug, Error)]
pub enum CliError {
    /// A credential was given neither as a flag nor in the environment.
    #[error("missing {0}: pass --{0} or set {1}")]
    MissingCredential(&'static str, &'static str),

    /// `--expires` is neither D/M/Y nor YYYY-MM-DD.
    #[error("invalid date '{0}': use D/M/Y (15/6/2025) or YYYY-MM-DD (2025-06-15)")]
    InvalidDate(String),
}

/// Credentials from flags or the environment.
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn email(&self) -> Result<&str, CliError> {
        self.email
            .as_deref()
            .ok_or(CliError::MissingCredential("email", "PANTRY_EMAIL"))
    }

    pub fn password(&self) -> Result<&str, CliError> {
        self.password
            .as_deref()
            .ok_or(CliError::MissingCredential("password", "PANTRY_PASSWORD"))
    }
}

/// Search and category filter shared by `list` and `watch`.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Case-insensitive substring of the item name
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Category label or alias, or "all"
    #[arg(short, long, default_value = CategoryFilter::ALL_LABEL)]
    pub category: CategoryFilter,
}

/// Firebase clients sharing one session.
pub struct Backend {
    pub auth: FirebaseAuth,
    pub store: FirestoreStore,
}

impl Backend {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = BackendConfig::from_env()?;
        let auth = FirebaseAuth::new(&config.firebase)?;
        let store = FirestoreStore::new(&config, auth.session())?;
        Ok(Self { auth, store })
    }

    /// Build the clients and log in with `credentials`.
    pub async fn signed_in(
        credentials: &Credentials,
    ) -> Result<(Self, User), Box<dyn std::error::Error>> {
        let backend = Self::from_env()?;
        let user = backend.login(credentials).await?;
        Ok((backend, user))
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, Box<dyn std::error::Error>> {
        let user = AccountService::new(&self.auth)
            .login(credentials.email()?, credentials.password()?)
            .await
            .map_err(|e| -> Box<dyn std::error::Error> {
                match e {
                    AuthError::EmailNotVerified => format!(
                        "{e}. Run `pantry resend-verification` to get a new link."
                    )
                    .into(),
                    other => other.into(),
                }
            })?;
        Ok(user)
    }
}

/// Write one line to stdout.
pub fn say(line: impl std::fmt::Display) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}
