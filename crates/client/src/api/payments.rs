//! Subscription payments for shop setup and renewal.
//!
//! The gateway checkout itself happens outside this client: callers create a
//! gateway order here, let the customer pay, then submit the
//! [`PaymentConfirmation`] for verification.

use drovo_core::SubscriptionPlan;
use reqwest::multipart::Form;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, instrument};

use super::food::image_part;
use super::types::{GatewayOrder, PaymentConfirmation, ShopSetup};
use super::{ApiClient, Auth, field, message};
use crate::error::Result;

#[derive(Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    token: &'a str,
}

#[derive(Serialize)]
struct RenewalVerification<'a> {
    #[serde(flatten)]
    confirmation: &'a PaymentConfirmation,
    subscription: i64,
}

impl ApiClient {
    /// Create a gateway order for a new shop's first subscription.
    ///
    /// The amount is sent in paise.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be created or the request fails.
    #[instrument(skip(self, token), fields(%plan))]
    pub async fn create_setup_payment(
        &self,
        token: &SecretString,
        plan: SubscriptionPlan,
    ) -> Result<GatewayOrder> {
        let request = CreateOrder {
            amount: plan.rupees() * 100,
            token: token.expose_secret(),
        };
        let mut body = self
            .post_json("api/payment/create-order", Auth::Anonymous, &request)
            .await?;
        field(&mut body, "order")
    }

    /// Verify the first payment and submit the shop setup form.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails or the request fails.
    #[instrument(skip(self, setup, confirmation), fields(shop = %setup.name, plan = %setup.plan))]
    pub async fn complete_setup(
        &self,
        setup: ShopSetup,
        confirmation: &PaymentConfirmation,
    ) -> Result<Option<String>> {
        let form = Form::new()
            .text("name", setup.name)
            .text("address", setup.address)
            .text("email", setup.email.into_inner())
            .text("phone", setup.phone.as_str().to_string())
            .text("subscription", setup.plan.code())
            .text("razorpay_order_id", confirmation.razorpay_order_id.clone())
            .text("razorpay_payment_id", confirmation.razorpay_payment_id.clone())
            .text("razorpay_signature", confirmation.razorpay_signature.clone())
            .text("latitude", setup.latitude.to_string())
            .text("longitude", setup.longitude.to_string())
            .part("shopImage", image_part(setup.image));

        let body = self
            .post_multipart("api/payment/verify", Auth::Anonymous, form)
            .await?;
        info!("Shop setup completed");
        Ok(message(&body))
    }

    /// Create a gateway order to renew the owner's subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be created or the request fails.
    #[instrument(skip(self, token), fields(%plan))]
    pub async fn create_renewal_payment(
        &self,
        token: &SecretString,
        plan: SubscriptionPlan,
    ) -> Result<GatewayOrder> {
        let request = CreateOrder {
            amount: plan.rupees(),
            token: token.expose_secret(),
        };
        let mut body = self
            .post_json("api/payment/createRenewalOrder", Auth::Anonymous, &request)
            .await?;
        field(&mut body, "order")
    }

    /// Verify a renewal payment.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails or the request fails.
    #[instrument(skip(self, token, confirmation), fields(%plan))]
    pub async fn verify_renewal(
        &self,
        token: &SecretString,
        plan: SubscriptionPlan,
        confirmation: &PaymentConfirmation,
    ) -> Result<Option<String>> {
        let request = RenewalVerification {
            confirmation,
            subscription: plan.rupees(),
        };
        let body = self
            .post_json("api/payment/verifyRenewalPayment", Auth::Bearer(token), &request)
            .await?;
        info!("Subscription renewed");
        Ok(message(&body))
    }
}
