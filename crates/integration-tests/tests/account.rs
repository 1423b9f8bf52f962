//! Registration, email verification, password reset and profile updates
//! against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use solar_market_client::{
    AuthState, ClientConfig, ClientError, CommerceProvider, MemoryStorage, ProfileUpdate,
    Registration, SessionStorage, StorageKey, User,
};
use solar_market_core::Role;
use solar_market_integration_tests::{EMAIL, FakeBackend, PASSWORD, RESET_TOKEN};

fn registration(email: &str) -> Registration {
    Registration {
        name: "Ray Installer".into(),
        email: email.into(),
        password: "panels123".into(),
        role: Role::Customer,
        phone: None,
        vendor: None,
    }
}

#[tokio::test]
async fn test_register_awaiting_verification_stays_logged_out() {
    let backend = FakeBackend::start().await;
    let provider = backend.provider();

    let user = provider
        .register(&registration("ray@example.com"))
        .await
        .unwrap();

    assert_eq!(user.email, "ray@example.com");
    assert_eq!(user.role, Role::Customer);
    assert!(!user.is_email_verified);
    assert_eq!(provider.auth_state(), AuthState::Unauthenticated);
    assert!(provider.access_token_cookie().is_none());
    assert_eq!(backend.hits("GET /cart"), 0);
}

#[tokio::test]
async fn test_register_existing_email_is_rejected() {
    let backend = FakeBackend::start().await;
    let provider = backend.provider();

    let err = provider.register(&registration(EMAIL)).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));
    assert_eq!(err.to_string(), "Email already registered");
    assert_eq!(provider.auth_state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_vendor_registration_needs_business_name() {
    let backend = FakeBackend::start().await;
    let provider = backend.provider();
    let mut vendor = registration("new-vendor@example.com");
    vendor.role = Role::Vendor;

    let err = provider.register(&vendor).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(backend.hits("POST /auth/register"), 0);
}

#[tokio::test]
async fn test_verify_email_marks_user_verified() {
    let backend = FakeBackend::start().await;
    let provider = backend.logged_in_provider().await;
    assert!(!provider.user().await.unwrap().is_email_verified);
    assert!(!provider.verify_status().await.unwrap().is_email_verified);

    let message = provider.verify_email("link-token").await.unwrap();

    assert_eq!(message, "Email verified successfully");
    assert!(provider.user().await.unwrap().is_email_verified);
    assert!(provider.verify_status().await.unwrap().is_email_verified);
}

#[tokio::test]
async fn test_password_reset() {
    let backend = FakeBackend::start().await;
    let provider = backend.provider();
    let mut events = provider.subscribe();

    let sent = provider.forgot_password(EMAIL).await.unwrap();
    assert_eq!(sent, "If that account exists, a reset link is on its way");

    let err = provider
        .reset_password("expired", &"brand-new-pass".into())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid or expired reset token");

    let done = provider
        .reset_password(RESET_TOKEN, &"brand-new-pass".into())
        .await
        .unwrap();
    assert_eq!(done, "Password has been reset");

    let err = provider
        .reset_password(RESET_TOKEN, &"short".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(backend.hits("POST /auth/reset-password"), 2);

    // None of this touches the session
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_update_profile_replaces_stored_user() {
    let backend = FakeBackend::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let config = ClientConfig::new(&backend.url()).unwrap();
    let provider = CommerceProvider::new(config, storage.clone()).unwrap();
    provider.login(EMAIL, &PASSWORD.into()).await.unwrap();

    let user = provider
        .update_profile(&ProfileUpdate {
            name: Some("Sunny Solar Co".into()),
            phone: Some("+1 520 555 0199".into()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();

    assert_eq!(user.name, "Sunny Solar Co");
    assert_eq!(provider.user().await.unwrap().phone.as_deref(), Some("+1 520 555 0199"));

    let stored: User =
        serde_json::from_str(&storage.get(StorageKey::User).unwrap().unwrap()).unwrap();
    assert_eq!(stored.name, "Sunny Solar Co");
    assert_eq!(backend.hits("PATCH /profile"), 1);
}
