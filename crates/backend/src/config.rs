//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key of the Firebase project
//! - `FIREBASE_PROJECT_ID` - Firebase project ID (owns the Firestore database)
//!
//! ## Optional
//! - `PANTRY_COLLECTION` - Firestore collection holding pantry items (default: pantry)
//! - `FIREBASE_AUTH_URL` - Identity Toolkit base URL (default: <https://identitytoolkit.googleapis.com/v1>)
//! - `FIRESTORE_URL` - Firestore REST base URL (default: <https://firestore.googleapis.com/v1>)
//! - `PANTRY_POLL_INTERVAL_SECS` - Seconds between subscription polls (default: 5, minimum: 1)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_COLLECTION: &str = "pantry";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Real web API keys are 39 random-looking characters and score well above
/// this. Hand-typed placeholders score below it.
const MIN_KEY_ENTROPY_BITS: f64 = 3.3;

/// Substrings that mark a value copied from a template (case-insensitive).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "your_",
    "api-key",
    "api_key",
    "changeme",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "replace",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub firebase: FirebaseConfig,
    /// Firestore collection holding pantry items
    pub collection: String,
    /// Delay between subscription polls
    pub poll_interval: Duration,
    pub sentry_dsn: Option<String>,
}

/// Firebase project configuration.
///
/// `Debug` is written by hand so the API key never reaches a log line.
#[derive(Clone)]
pub struct FirebaseConfig {
    pub api_key: SecretString,
    pub project_id: String,
    /// Identity Toolkit base URL
    pub auth_url: Url,
    /// Firestore REST base URL
    pub firestore_url: Url,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("auth_url", &self.auth_url.as_str())
            .field("firestore_url", &self.firestore_url.as_str())
            .finish()
    }
}

impl FirebaseConfig {
    /// Firestore documents root of this project's default database.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_url.as_str().trim_end_matches('/'),
            self.project_id
        )
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key looks like a template value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let firebase = FirebaseConfig {
            api_key: vars.secret("FIREBASE_API_KEY")?,
            project_id: vars.required("FIREBASE_PROJECT_ID")?,
            auth_url: vars.url("FIREBASE_AUTH_URL", DEFAULT_AUTH_URL)?,
            firestore_url: vars.url("FIRESTORE_URL", DEFAULT_FIRESTORE_URL)?,
        };

        let collection = vars.or_default("PANTRY_COLLECTION", DEFAULT_COLLECTION);
        if collection.contains('/') {
            return Err(ConfigError::InvalidEnvVar(
                "PANTRY_COLLECTION".to_string(),
                "must be a single path segment".to_string(),
            ));
        }

        Ok(Self {
            firebase,
            collection,
            poll_interval: vars.poll_interval("PANTRY_POLL_INTERVAL_SECS")?,
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }
}

/// `SENTRY_DSN`, if set and non-empty.
///
/// Readable without the rest of the configuration so binaries can start
/// error tracking before anything else can fail.
#[must_use]
pub fn sentry_dsn() -> Option<String> {
    Vars(|key: &str| std::env::var(key).ok()).optional("SENTRY_DSN")
}

// =============================================================================
// Variable access
// =============================================================================

/// Typed reads over a key lookup. Empty values count as unset.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// An HTTP(S) base URL.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEnvVar(key.to_string(), reason);
        let url = Url::parse(&self.or_default(key, default)).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    /// Whole seconds, at least one.
    fn poll_interval(&self, key: &str) -> Result<Duration, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS));
        };
        match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be at least 1".to_string(),
            )),
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        }
    }

    /// A required secret that must not look like a template value.
    fn secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        check_not_placeholder(key, &value)?;
        Ok(SecretString::from(value))
    }
}

// =============================================================================
// Secret checks
// =============================================================================

/// Shannon entropy of `s` in bits per character.
fn entropy_bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

fn check_not_placeholder(key: &str, value: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(key.to_string(), reason);
    let lower = value.to_lowercase();

    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(**m)) {
        return Err(insecure(format!(
            "looks like a template value (contains '{marker}')"
        )));
    }

    let bits = entropy_bits_per_char(value);
    if bits < MIN_KEY_ENTROPY_BITS {
        return Err(insecure(format!(
            "entropy too low ({bits:.2} bits/char, need >= {MIN_KEY_ENTROPY_BITS:.1}). Copy the key from the Firebase console."
        )));
    }

    Ok(())
}
