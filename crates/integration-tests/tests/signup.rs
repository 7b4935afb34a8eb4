//! Integration tests for shop sign-up and identity-provider logins.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use drovo_client::api::types::{GoogleRegistration, OtpVerification};
use drovo_client::{ApiError, GoogleLoginOutcome, StoreError};
use drovo_core::{Email, UserType};
use drovo_integration_tests::{
    FakeApi, KNOWN_GOOGLE_ID_TOKEN, NEW_GOOGLE_ID_TOKEN, SIGNUP_OTP, VALID_TOKEN,
};
use secrecy::ExposeSecret;
use serde_json::json;

fn owner_email() -> Email {
    Email::parse("Owner@Gokul-Dairy.in").unwrap()
}

fn verification(otp: &str) -> OtpVerification {
    OtpVerification {
        email: owner_email(),
        otp: otp.to_string(),
        name: "Gokul Dairy".to_string(),
        password: "shop-secret".to_string(),
    }
}

// =============================================================================
// OTP Sign-up
// =============================================================================

#[tokio::test]
async fn test_send_otp() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let message = store
        .api()
        .send_otp(&owner_email(), "shop-secret")
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("OTP sent to your email"));

    let request = &api.recorded.requests_to("/api/send-otp")[0];
    assert_eq!(
        request.body,
        json!({"email": "owner@gokul-dairy.in", "password": "shop-secret"})
    );
    assert_eq!(request.token, None);

    store.shutdown().await;
}

#[tokio::test]
async fn test_verify_otp_logs_in_as_shop() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    store
        .verify_shop_signup(&verification(SIGNUP_OTP))
        .await
        .unwrap();
    assert!(store.session().is_authenticated());
    assert_eq!(store.session().user_type(), UserType::Shop);
    assert_eq!(store.token().unwrap().expose_secret(), VALID_TOKEN);
    assert_eq!(store.session().shop_name().as_deref(), Some("Gokul Dairy"));
    assert_eq!(
        store.session().shop_email().as_deref(),
        Some("owner@gokul-dairy.in")
    );

    let request = &api.recorded.requests_to("/api/verify-otp")[0];
    assert_eq!(request.body["otp"], SIGNUP_OTP);
    assert_eq!(request.body["name"], "Gokul Dairy");

    store.shutdown().await;
}

#[tokio::test]
async fn test_wrong_otp_stays_guest() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    let result = store.verify_shop_signup(&verification("000000")).await;
    match result {
        Err(StoreError::Api(ApiError::Api { message, .. })) => assert_eq!(message, "Invalid OTP"),
        other => panic!("expected an API error, got {other:?}"),
    }
    assert!(!store.session().is_authenticated());
    assert_eq!(store.session().shop_name(), None);

    store.shutdown().await;
}

// =============================================================================
// Identity-provider Login
// =============================================================================

#[tokio::test]
async fn test_google_login_existing_account() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    let outcome = store
        .login_google(KNOWN_GOOGLE_ID_TOKEN, UserType::User)
        .await
        .unwrap();
    assert!(matches!(outcome, GoogleLoginOutcome::LoggedIn));
    assert!(store.session().is_authenticated());

    let request = &api.recorded.requests_to("/api/login/google")[0];
    assert_eq!(
        request.body,
        json!({"token": KNOWN_GOOGLE_ID_TOKEN, "userType": "user"})
    );

    store.shutdown().await;
}

#[tokio::test]
async fn test_google_login_new_account_needs_registration() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    let outcome = store
        .login_google(NEW_GOOGLE_ID_TOKEN, UserType::Shop)
        .await
        .unwrap();
    assert!(matches!(outcome, GoogleLoginOutcome::NeedsRegistration));
    assert!(!store.session().is_authenticated());

    let registration = GoogleRegistration {
        name: "Gokul Dairy".to_string(),
        email: owner_email(),
        role: UserType::Shop,
        password: "shop-secret".to_string(),
    };
    store.register_google(&registration).await.unwrap();
    assert!(store.session().is_authenticated());
    assert_eq!(store.session().user_type(), UserType::Shop);
    assert_eq!(store.session().shop_name().as_deref(), Some("Gokul Dairy"));

    let request = &api.recorded.requests_to("/api/register-google")[0];
    assert_eq!(request.body["role"], "shop");
    assert_eq!(request.body["email"], "owner@gokul-dairy.in");

    store.shutdown().await;
}

#[tokio::test]
async fn test_google_login_rejected_token() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    let result = store.login_google("google-id-forged", UserType::User).await;
    assert!(matches!(result, Err(StoreError::Api(ApiError::Api { .. }))));
    assert!(!store.session().is_authenticated());

    store.shutdown().await;
}
