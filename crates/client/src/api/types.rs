//! Request and response bodies of the marketplace REST API.
//!
//! Field names follow the server's JSON (camelCase, `_id`, and the gateway's
//! snake_case payment fields).

use chrono::{DateTime, Utc};
use drovo_core::{
    CatalogItem, DeliveryAddress, Email, OrderId, OrderLine, OrderStatus, Price, ShopId,
    SubscriptionPlan, Unit, UserType,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shops
// =============================================================================

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

/// Street address of a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopAddress {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ShopAddress {
    /// Google Maps search link for the shop.
    #[must_use]
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.latitude, self.longitude
        )
    }

    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Gateway references of the last subscription payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// A shop as listed on the home page and shown to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(rename = "_id")]
    pub id: ShopId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub shop_image: Option<String>,
    #[serde(default)]
    pub shop_address: Option<ShopAddress>,
    /// Current plan code (the plan price as a string).
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub sub_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_setup_complete: Option<bool>,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

impl Shop {
    /// Whether the subscription has lapsed at `now`.
    #[must_use]
    pub fn subscription_expired(&self, now: DateTime<Utc>) -> bool {
        self.sub_end_date.is_some_and(|end| end < now)
    }

    /// The current plan, if it is one of the known plans.
    #[must_use]
    pub fn plan(&self) -> Option<SubscriptionPlan> {
        self.subscription.as_deref()?.parse().ok()
    }
}

/// `GET /api/shops/{id}`: a shop with its menu.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPage {
    pub shop: Shop,
    #[serde(default)]
    pub food_items: Vec<CatalogItem>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl ShopPage {
    /// Where the shop is, from either the top-level coordinates or its address.
    #[must_use]
    pub fn location(&self) -> Option<Coordinates> {
        self.coordinates.or_else(|| {
            self.shop
                .shop_address
                .as_ref()
                .map(ShopAddress::coordinates)
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

/// `POST /api/login` and `POST /api/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: Email,
    pub password: String,
    pub role: UserType,
}

/// `POST /api/send-otp` (shop sign-up, step 1).
#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub email: Email,
    pub password: String,
}

/// `POST /api/verify-otp` (shop sign-up, step 2).
#[derive(Debug, Clone, Serialize)]
pub struct OtpVerification {
    pub email: Email,
    pub otp: String,
    pub name: String,
    pub password: String,
}

/// `POST /api/login/google`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLogin {
    /// ID token issued by the identity provider.
    pub token: String,
    pub user_type: UserType,
}

/// `POST /api/register-google`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleRegistration {
    pub name: String,
    pub email: Email,
    pub role: UserType,
    pub password: String,
}

/// Successful authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Food
// =============================================================================

/// Fields of the owner's "add item" form (`POST /api/food/add`, multipart).
#[derive(Debug, Clone)]
pub struct NewFoodItem {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub unit: Unit,
    /// Amount of product per package.
    pub quantity: u32,
    pub image: ImageUpload,
}

/// An image file to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Cart mirroring
// =============================================================================

/// Body of `POST /api/cart/add` and `POST /api/cart/remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: drovo_core::ItemId,
    pub shop_id: ShopId,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    pub items: Vec<OrderLine>,
    pub amount: Price,
    #[serde(default)]
    pub delivery_charge: Price,
    pub address: DeliveryAddress,
    #[serde(default)]
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub payment: bool,
}

impl Order {
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.amount + self.delivery_charge
    }

    /// Short `name - quantity, ...` summary of the lines.
    #[must_use]
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|line| format!("{} - {}", line.name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `GET /api/order/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    #[serde(default)]
    pub shop: Option<Shop>,
}

/// `POST /api/order/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// `POST /api/order/feedback`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub name: String,
    pub email: Email,
    /// 1 to 5 stars.
    pub rating: u8,
    pub message: String,
    pub shop_email: String,
}

/// Confirmation message returned by write endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

/// Order created with the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
}

/// What the gateway's checkout hands back after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Shop setup form submitted together with the first payment.
#[derive(Debug, Clone)]
pub struct ShopSetup {
    pub name: String,
    pub email: Email,
    pub phone: drovo_core::Phone,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub plan: SubscriptionPlan,
    pub image: ImageUpload,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_order() {
        let json = r#"{
            "_id": "o1",
            "userId": "u1",
            "shopId": "s1",
            "items": [{"_id": "i1", "name": "Paneer", "price": 90, "quantity": "1.50 kg"}],
            "amount": 270,
            "deliveryCharge": 15,
            "address": {
                "firstName": "Asha", "lastName": "Rao", "phone": "9876543210",
                "street": "MG Road", "latitude": 18.5, "longitude": 73.8,
                "flat": "4B", "floor": "", "landmark": ""
            },
            "status": "Out for delivery",
            "date": "2024-10-01T10:15:00.000Z",
            "payment": false
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.grand_total(), Price::from_rupees(285));
        assert_eq!(order.summary(), "Paneer - 1.50 kg");
    }

    #[test]
    fn test_shop_page_location_falls_back_to_address() {
        let json = r#"{
            "shop": {
                "_id": "s1", "name": "Gokul Dairy",
                "shopAddress": {"address": "Kothrud", "latitude": 18.5, "longitude": 73.8},
                "subscription": "149",
                "subEndDate": "2024-01-01T00:00:00Z"
            },
            "foodItems": []
        }"#;
        let page: ShopPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.location(), Some(Coordinates { lat: 18.5, lng: 73.8 }));
        assert_eq!(page.shop.plan(), Some(SubscriptionPlan::OneMonth));
        assert!(page.shop.subscription_expired(Utc::now()));
    }

    #[test]
    fn test_cart_line_wire_format() {
        let line = CartLine {
            item_id: "i1".into(),
            shop_id: "s1".into(),
        };
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            serde_json::json!({"itemId": "i1", "shopId": "s1"})
        );
    }
}
