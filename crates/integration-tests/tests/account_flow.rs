//! Register, verify and login flows over the in-memory backend.

#![allow(clippy::unwrap_used)]

use smart_pantry_backend::{AuthError, AuthProvider};
use smart_pantry_core::{Email, PasswordError, ValidationError};
use smart_pantry_integration_tests::{PASSWORD, TestContext, registration};

#[tokio::test]
async fn test_register_verify_login() {
    let ctx = TestContext::new();

    let registered = ctx
        .accounts()
        .register(&registration("Furkan", "furkan@example.com"))
        .await
        .unwrap();
    assert!(registered.verification_sent);
    assert!(!registered.user.email_verified);
    assert!(ctx.auth.current_user().await.is_none());

    let err = ctx
        .accounts()
        .login("furkan@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailNotVerified));
    assert!(ctx.auth.current_user().await.is_none());

    ctx.auth
        .verify_email(&Email::parse("furkan@example.com").unwrap())
        .await;
    let user = ctx
        .accounts()
        .login("furkan@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(user.id, registered.user.id);
    assert_eq!(user.greeting_name(), "Furkan");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_by_provider() {
    let ctx = TestContext::new();
    ctx.accounts()
        .register(&registration("Furkan", "furkan@example.com"))
        .await
        .unwrap();

    let err = ctx
        .accounts()
        .register(&registration("Someone", "FURKAN@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Provider(ref m) if m == "EMAIL_EXISTS"));
}

#[tokio::test]
async fn test_weak_password_never_reaches_provider() {
    let ctx = TestContext::new();
    let mut form = registration("Furkan", "furkan@example.com");

    for (password, expected) in [
        ("Ab1!", PasswordError::TooShort { min: 6 }),
        ("kiler1!", PasswordError::MissingUppercase),
        ("Kiler!!", PasswordError::MissingDigit),
        ("Kiler12", PasswordError::MissingSpecial),
    ] {
        form.password = password.to_string();
        let err = ctx.accounts().register(&form).await.unwrap_err();
        assert!(
            matches!(err, AuthError::Validation(ValidationError::WeakPassword(ref e)) if *e == expected),
            "{password}: {err}"
        );
    }
    assert_eq!(ctx.auth.verification_emails_sent(), 0);
}

#[tokio::test]
async fn test_wrong_password_reports_provider_message() {
    let ctx = TestContext::new();
    ctx.signed_in_as("Furkan", "furkan@example.com")
        .await
        .unwrap();
    ctx.accounts().logout().await;

    let err = ctx
        .accounts()
        .login("furkan@example.com", "Wrong1!")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "INVALID_LOGIN_CREDENTIALS");
}

#[tokio::test]
async fn test_resend_verification_then_login() {
    let ctx = TestContext::new();
    ctx.auth.fail_verification_emails(true);
    let registered = ctx
        .accounts()
        .register(&registration("Furkan", "furkan@example.com"))
        .await
        .unwrap();
    assert!(!registered.verification_sent);

    ctx.auth.fail_verification_emails(false);
    ctx.accounts()
        .resend_verification("furkan@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(ctx.auth.verification_emails_sent(), 1);
    assert!(ctx.auth.current_user().await.is_none());
}

#[tokio::test]
async fn test_greeting_defaults_without_display_name() {
    let ctx = TestContext::new();
    let email = Email::parse("anon@example.com").unwrap();
    ctx.auth.sign_up(&email, PASSWORD).await.unwrap();
    ctx.auth.verify_email(&email).await;
    ctx.auth.sign_out().await;

    let user = ctx
        .accounts()
        .login("anon@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(user.greeting_name(), "Welcome");
    assert_eq!(ctx.accounts().greeting().await.as_deref(), Some("Welcome"));
}
