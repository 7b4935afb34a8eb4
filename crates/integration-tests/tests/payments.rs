//! Integration tests for subscription payments.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use drovo_client::ApiError;
use drovo_client::api::types::PaymentConfirmation;
use drovo_core::SubscriptionPlan;
use drovo_integration_tests::{FakeApi, VALID_TOKEN};
use secrecy::SecretString;

fn confirmation() -> PaymentConfirmation {
    PaymentConfirmation {
        razorpay_order_id: "order_renewal".to_string(),
        razorpay_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        razorpay_signature: "9ef4dffbfd84f1318f6739a3ce19f9d85851857ae648f114332d8401e0949a3d"
            .to_string(),
    }
}

#[tokio::test]
async fn test_setup_payment_is_in_paise() {
    let api = FakeApi::start().await;
    let store = api.guest_store();
    let token = SecretString::from(VALID_TOKEN);

    let order = store
        .api()
        .create_setup_payment(&token, SubscriptionPlan::OneMonth)
        .await
        .unwrap();
    assert_eq!(order.id, "order_setup");
    assert_eq!(order.amount, 14_900);
    assert_eq!(order.currency, "INR");

    // The token travels in the body, not in a header
    let request = &api.recorded.requests_to("/api/payment/create-order")[0];
    assert_eq!(request.body["amount"], 14_900);
    assert_eq!(request.body["token"], VALID_TOKEN);
    assert_eq!(request.token, None);

    store.shutdown().await;
}

#[tokio::test]
async fn test_renewal_payment_is_in_rupees() {
    let api = FakeApi::start().await;
    let store = api.guest_store();
    let token = SecretString::from(VALID_TOKEN);

    store
        .api()
        .create_renewal_payment(&token, SubscriptionPlan::ThreeMonths)
        .await
        .unwrap();

    let request = &api.recorded.requests_to("/api/payment/createRenewalOrder")[0];
    assert_eq!(request.body["amount"], 299);
    assert_eq!(request.body["token"], VALID_TOKEN);

    store.shutdown().await;
}

#[tokio::test]
async fn test_verify_renewal_uses_bearer_auth() {
    let api = FakeApi::start().await;
    let store = api.guest_store();
    let token = SecretString::from(VALID_TOKEN);

    let message = store
        .api()
        .verify_renewal(&token, SubscriptionPlan::OneMonth, &confirmation())
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("Subscription renewed"));

    let request = &api.recorded.requests_to("/api/payment/verifyRenewalPayment")[0];
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {VALID_TOKEN}").as_str())
    );
    assert_eq!(request.token, None);
    assert_eq!(request.body["razorpay_order_id"], "order_renewal");
    assert_eq!(request.body["razorpay_payment_id"], "pay_29QQoUBi66xm2f");
    assert_eq!(request.body["subscription"], 149);

    store.shutdown().await;
}

#[tokio::test]
async fn test_verify_renewal_rejects_other_token() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let result = store
        .api()
        .verify_renewal(
            &SecretString::from("tok-someone-else"),
            SubscriptionPlan::OneMonth,
            &confirmation(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    assert!(
        api.recorded
            .requests_to("/api/payment/verifyRenewalPayment")
            .is_empty()
    );

    store.shutdown().await;
}
