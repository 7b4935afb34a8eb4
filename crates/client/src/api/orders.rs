//! Placing, tracking and managing orders.

use drovo_core::{OrderId, OrderStatus, PlaceOrder};
use secrecy::SecretString;
use serde_json::json;
use tracing::{info, instrument};

use super::types::{Feedback, Order, OrderDetails, StatusUpdate};
use super::{ApiClient, Auth, data, message};
use crate::error::Result;

impl ApiClient {
    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected or the request fails.
    #[instrument(skip(self, token, order), fields(shop_id = %order.shop_id, lines = order.items.len()))]
    pub async fn place_order(&self, token: &SecretString, order: &PlaceOrder) -> Result<Option<String>> {
        let body = self
            .post_json("api/order/place", Auth::Token(token), order)
            .await?;
        info!(total = %order.grand_total(), "Order placed");
        Ok(message(&body))
    }

    /// The customer's own orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<Order>> {
        let mut body = self
            .post_json("api/order/userorders", Auth::Token(token), &json!({}))
            .await?;
        data(&mut body)
    }

    /// Orders received by the owner's shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Redirect`] if setup or renewal is pending,
    /// or an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn shop_orders(&self, token: &SecretString) -> Result<Vec<Order>> {
        let mut body = self.get("api/order/list", Auth::Token(token)).await?;
        let mut orders: Vec<Order> = data(&mut body)?;
        orders.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(orders)
    }

    /// Move an order to another stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id, %status))]
    pub async fn update_order_status(
        &self,
        token: &SecretString,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<()> {
        let update = StatusUpdate {
            order_id: order_id.clone(),
            status,
        };
        self.post_json("api/order/status", Auth::Token(token), &update)
            .await?;
        info!("Order status updated");
        Ok(())
    }

    /// One order with the shop it was placed at.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::NotFound`] for unknown orders, or an error
    /// if the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn order_details(&self, token: &SecretString, order_id: &OrderId) -> Result<OrderDetails> {
        let body = self
            .get(&format!("api/order/{order_id}"), Auth::Token(token))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Send feedback about an order to its shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the feedback is rejected or the request fails.
    #[instrument(skip(self, token, feedback), fields(rating = feedback.rating))]
    pub async fn send_feedback(&self, token: &SecretString, feedback: &Feedback) -> Result<Option<String>> {
        let body = self
            .post_json("api/order/feedback", Auth::Token(token), feedback)
            .await?;
        Ok(message(&body))
    }
}
