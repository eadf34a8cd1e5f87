//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! pantry --email cook@example.com register --name Furkan
//! pantry --email cook@example.com login
//! pantry --email cook@example.com resend-verification
//! PANTRY_PASSWORD='Kiler1!' pantry check-password
//! ```

use smart_pantry_backend::AccountService;
use smart_pantry_core::{RegistrationForm, validate_password};

use super::{Backend, Credentials, say};

/// Create an account, then sign out until the address is verified.
pub async fn register(
    credentials: &Credentials,
    display_name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = RegistrationForm {
        display_name,
        email: credentials.email()?.to_owned(),
        password: credentials.password()?.to_owned(),
    };
    form.validate()?;

    let backend = Backend::from_env()?;
    let registration = AccountService::new(&backend.auth).register(&form).await?;

    say(format_args!("Account created for {}.", registration.user.email))?;
    if registration.verification_sent {
        say("Check your inbox and follow the verification link, then log in.")?;
    } else {
        say("The verification email could not be sent. Try `pantry resend-verification`.")?;
    }
    Ok(())
}

/// Sign in and greet.
pub async fn login(credentials: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    let (_backend, user) = Backend::signed_in(credentials).await?;
    say(format_args!("Hello, {}!", user.greeting_name()))?;
    Ok(())
}

pub async fn resend_verification(
    credentials: &Credentials,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = Backend::from_env()?;
    AccountService::new(&backend.auth)
        .resend_verification(credentials.email()?, credentials.password()?)
        .await?;
    say("Verification email sent.")?;
    Ok(())
}

/// Run the strength rules on the configured password without contacting
/// the backend.
pub fn check_password(credentials: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    validate_password(credentials.password()?)?;
    say("Password meets all requirements.")?;
    Ok(())
}
