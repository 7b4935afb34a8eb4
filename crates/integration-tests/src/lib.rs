//! Integration tests for the Drovo client.
//!
//! [`FakeApi`] is an in-process stand-in for the marketplace REST API, bound
//! to `127.0.0.1:0`. It serves one shop with a small menu and records the
//! calls it receives so tests can check what reached the server.
//!
//! # Tokens
//!
//! | token | behaviour |
//! |---|---|
//! | [`VALID_TOKEN`] | accepted everywhere |
//! | [`EXPIRED_TOKEN`] | every authenticated call answers `401 Token expired` |
//! | [`LAPSED_TOKEN`] | owner calls answer with a renewal redirect |
//!
//! Renewal verification expects [`VALID_TOKEN`] as a bearer token instead.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use drovo_client::{ClientConfig, MemoryStore, Session, SessionStore, Store, session};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const VALID_TOKEN: &str = "tok-valid";
pub const EXPIRED_TOKEN: &str = "tok-expired";
pub const LAPSED_TOKEN: &str = "tok-lapsed";

pub const SHOP_ID: &str = "shop-gokul";
pub const CUSTOMER_EMAIL: &str = "asha@example.com";
pub const CUSTOMER_PASSWORD: &str = "secret";

/// OTP the sign-up verification accepts.
pub const SIGNUP_OTP: &str = "424242";
/// Identity-provider ID token of an account that does not exist yet.
pub const NEW_GOOGLE_ID_TOKEN: &str = "google-id-new";
/// Identity-provider ID token of an existing account.
pub const KNOWN_GOOGLE_ID_TOKEN: &str = "google-id-known";
/// The only order [`FakeApi`] knows the details of.
pub const KNOWN_ORDER_ID: &str = "order-b";

/// A cart call as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartCall {
    pub action: &'static str,
    pub token: Option<String>,
    pub item_id: String,
    pub shop_id: String,
}

/// Any other request as the server saw it.
///
/// Multipart forms are flattened into a JSON object: text fields map to their
/// value, file fields to `{"fileName", "size"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub path: &'static str,
    pub token: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Everything the fake server has recorded.
#[derive(Debug, Default)]
pub struct Recorded {
    cart_calls: Mutex<Vec<CartCall>>,
    orders: Mutex<Vec<Value>>,
    requests: Mutex<Vec<Request>>,
    menu_requests: AtomicUsize,
}

impl Recorded {
    #[must_use]
    pub fn cart_calls(&self) -> Vec<CartCall> {
        self.cart_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received on `path`, oldest first.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn menu_requests(&self) -> usize {
        self.menu_requests.load(Ordering::SeqCst)
    }

    fn record(&self, path: &'static str, headers: &HeaderMap, body: Value) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Request {
                path,
                token: token(headers),
                authorization: header(headers, "authorization"),
                body,
            });
    }
}

/// Running fake API server; stopped when dropped.
pub struct FakeApi {
    pub base_url: String,
    pub recorded: Arc<Recorded>,
    server: JoinHandle<()>,
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakeApi {
    /// Start the server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let recorded = Arc::new(Recorded::default());
        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/register", post(register))
            .route("/api/shops/all", get(all_shops))
            .route("/api/shops/details", get(shop_details))
            .route("/api/shops/{id}", get(shop_page))
            .route("/api/food/list/{id}", get(shop_menu))
            .route("/api/cart/add", post(cart_add))
            .route("/api/cart/remove", post(cart_remove))
            .route("/api/order/place", post(place_order))
            .route("/api/order/userorders", post(user_orders))
            .route("/api/order/list", get(shop_orders))
            .route("/api/order/status", post(update_status))
            .route("/api/order/feedback", post(feedback))
            .route("/api/order/{id}", get(order_details))
            .route("/api/send-otp", post(send_otp))
            .route("/api/verify-otp", post(verify_otp))
            .route("/api/login/google", post(login_google))
            .route("/api/register-google", post(register_google))
            .route("/api/food/add", post(add_food))
            .route("/api/payment/create-order", post(create_setup_order))
            .route("/api/payment/createRenewalOrder", post(create_renewal_order))
            .route("/api/payment/verifyRenewalPayment", post(verify_renewal))
            .with_state(recorded.clone());

        #[allow(clippy::expect_used)]
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake API listener");
        #[allow(clippy::expect_used)]
        let addr = listener.local_addr().expect("listener has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            recorded,
            server,
        }
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which cannot happen for a bound
    /// loopback address.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        #[allow(clippy::expect_used)]
        ClientConfig::for_api_url(&self.base_url).expect("fake API URL is valid")
    }

    /// A store with a guest session.
    #[must_use]
    pub fn guest_store(&self) -> Store {
        Store::new(drovo_client::ApiClient::new(&self.config()), Session::guest())
    }

    /// A store whose persisted session already holds `token`.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory session store rejects a write.
    #[must_use]
    pub fn store_with_token(&self, token: &str) -> Store {
        let mut store = MemoryStore::new();
        #[allow(clippy::expect_used)]
        store
            .set(session::TOKEN_KEY, token)
            .expect("memory store accepts writes");
        Store::new(
            drovo_client::ApiClient::new(&self.config()),
            Session::restore(Box::new(store)),
        )
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn shop() -> Value {
    json!({
        "_id": SHOP_ID,
        "name": "Gokul Dairy",
        "email": "gokul@example.com",
        "phone": "9822012345",
        "shopImage": "gokul.png",
        "shopAddress": {"address": "Kothrud, Pune", "latitude": 18.507, "longitude": 73.807},
        "subscription": "149",
        "subEndDate": "2099-01-01T00:00:00.000Z",
        "isSetupComplete": true
    })
}

fn menu() -> Value {
    json!([
        {
            "_id": "milk-500", "name": "Toned Milk", "description": "Fresh toned milk",
            "price": 30, "image": "milk.png", "quantity": 500, "unit": "ml",
            "category": "Milk", "shopId": SHOP_ID
        },
        {
            "_id": "paneer-250", "name": "Malai Paneer", "description": "Soft paneer",
            "price": 90, "image": "paneer.png", "quantity": 250, "unit": "grams",
            "category": "Paneer", "shopId": SHOP_ID
        },
        {
            "_id": "ghee-1", "name": "Cow Ghee", "description": "",
            "price": 650, "image": "ghee.png", "quantity": 1, "unit": "Kg",
            "category": "Ghee", "shopId": SHOP_ID
        }
    ])
}

/// An order received by the shop, as the owner's order list returns it.
fn received_order(id: &str, date: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "userId": "user-asha",
        "shopId": SHOP_ID,
        "items": [{"_id": "paneer-250", "name": "Malai Paneer", "price": 90, "quantity": "500 grams"}],
        "amount": 180,
        "deliveryCharge": 15,
        "address": {
            "firstName": "Asha", "lastName": "Rao", "phone": "9876543210",
            "street": "Karve Road, Pune", "latitude": 18.503, "longitude": 73.812,
            "flat": "B-203", "floor": "2", "landmark": ""
        },
        "status": status,
        "date": date,
        "payment": false
    })
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn renewal_redirect() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "success": false,
            "message": "Your subscription has expired.",
            "redirect": "/renew-subscription"
        })),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<Arc<Recorded>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn token(headers: &HeaderMap) -> Option<String> {
    header(headers, "token")
}

/// Reject missing or expired tokens the way the real API does.
fn authorize(headers: &HeaderMap) -> Result<String, Response> {
    match token(headers).as_deref() {
        Some(EXPIRED_TOKEN) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Token expired"})),
        )
            .into_response()),
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Not Authorized Login Again"})),
        )
            .into_response()),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Json<Value> {
    if body.email == CUSTOMER_EMAIL && body.password == CUSTOMER_PASSWORD {
        Json(json!({"success": true, "token": VALID_TOKEN}))
    } else {
        Json(json!({"success": false, "message": "Invalid credentials"}))
    }
}

async fn register(Json(body): Json<Value>) -> Json<Value> {
    if body["email"] == CUSTOMER_EMAIL {
        return Json(json!({"success": false, "message": "User already exists"}));
    }
    Json(json!({"success": true, "token": VALID_TOKEN}))
}

async fn all_shops() -> Json<Value> {
    Json(json!({"success": true, "data": [shop()]}))
}

async fn shop_details(headers: HeaderMap) -> Response {
    match authorize(&headers) {
        Err(response) => response,
        Ok(token) if token == LAPSED_TOKEN => renewal_redirect(),
        Ok(_) => Json(json!({"success": true, "shop": shop()})).into_response(),
    }
}

async fn shop_page(Path(id): Path<String>) -> Response {
    if id != SHOP_ID {
        return failure(StatusCode::NOT_FOUND, "Shop not found");
    }
    Json(json!({
        "success": true,
        "data": {
            "shop": shop(),
            "foodItems": menu(),
            "coordinates": {"lat": 18.507, "lng": 73.807}
        }
    }))
    .into_response()
}

async fn shop_menu(State(recorded): Shared, Path(id): Path<String>) -> Json<Value> {
    recorded.menu_requests.fetch_add(1, Ordering::SeqCst);
    let items = if id == SHOP_ID { menu() } else { json!([]) };
    Json(json!({"success": true, "data": items}))
}

fn record_cart(
    recorded: &Recorded,
    action: &'static str,
    headers: &HeaderMap,
    body: &Value,
) -> Response {
    if let Err(response) = authorize(headers) {
        return response;
    }
    recorded
        .cart_calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(CartCall {
            action,
            token: token(headers),
            item_id: body["itemId"].as_str().unwrap_or_default().to_string(),
            shop_id: body["shopId"].as_str().unwrap_or_default().to_string(),
        });
    Json(json!({"success": true, "message": "Cart updated"})).into_response()
}

async fn cart_add(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_cart(&recorded, "add", &headers, &body)
}

async fn cart_remove(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_cart(&recorded, "remove", &headers, &body)
}

async fn place_order(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    recorded
        .orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);
    Json(json!({"success": true, "message": "Order Placed"})).into_response()
}

async fn user_orders(State(recorded): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let orders: Vec<Value> = recorded
        .orders()
        .into_iter()
        .enumerate()
        .map(|(i, mut order)| {
            order["_id"] = json!(format!("order-{i}"));
            order["status"] = json!("Food Processing");
            order["date"] = json!("2024-10-01T10:15:00.000Z");
            order["payment"] = json!(false);
            order
        })
        .collect();
    Json(json!({"success": true, "data": orders})).into_response()
}

// =============================================================================
// Owner Orders
// =============================================================================

async fn shop_orders(headers: HeaderMap) -> Response {
    match authorize(&headers) {
        Err(response) => response,
        Ok(token) if token == LAPSED_TOKEN => renewal_redirect(),
        // Deliberately not in date order
        Ok(_) => Json(json!({
            "success": true,
            "data": [
                received_order("order-a", "2024-10-01T08:00:00.000Z", "Delivered"),
                received_order(KNOWN_ORDER_ID, "2024-10-03T08:00:00.000Z", "Food Processing"),
                received_order("order-c", "2024-10-02T08:00:00.000Z", "Out for delivery"),
            ]
        }))
        .into_response(),
    }
}

async fn update_status(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    recorded.record("/api/order/status", &headers, body);
    Json(json!({"success": true, "message": "Status Updated"})).into_response()
}

async fn order_details(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    if id != KNOWN_ORDER_ID {
        return failure(StatusCode::NOT_FOUND, "Order not found");
    }
    // Not wrapped in `data`
    Json(json!({
        "success": true,
        "order": received_order(KNOWN_ORDER_ID, "2024-10-03T08:00:00.000Z", "Food Processing"),
        "shop": shop()
    }))
    .into_response()
}

async fn feedback(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    recorded.record("/api/order/feedback", &headers, body);
    Json(json!({"success": true, "message": "Feedback sent successfully"})).into_response()
}

async fn add_food(State(recorded): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(ToString::to_string);
        let Ok(bytes) = field.bytes().await else {
            return failure(StatusCode::BAD_REQUEST, "Malformed form");
        };
        let value = match file_name {
            Some(file_name) => json!({"fileName": file_name, "size": bytes.len()}),
            None => json!(String::from_utf8_lossy(&bytes)),
        };
        fields.insert(name, value);
    }
    recorded.record("/api/food/add", &headers, Value::Object(fields));
    Json(json!({"success": true, "message": "Food Added"})).into_response()
}

// =============================================================================
// Sign-up
// =============================================================================

async fn send_otp(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    recorded.record("/api/send-otp", &headers, body);
    Json(json!({"success": true, "message": "OTP sent to your email"}))
}

async fn verify_otp(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let accepted = body["otp"] == SIGNUP_OTP;
    recorded.record("/api/verify-otp", &headers, body);
    if accepted {
        Json(json!({"success": true, "token": VALID_TOKEN}))
    } else {
        Json(json!({"success": false, "message": "Invalid OTP"}))
    }
}

async fn login_google(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let id_token = body["token"].as_str().unwrap_or_default().to_string();
    recorded.record("/api/login/google", &headers, body);
    match id_token.as_str() {
        NEW_GOOGLE_ID_TOKEN => Json(json!({"success": true, "isNewUser": true})),
        KNOWN_GOOGLE_ID_TOKEN => Json(json!({
            "success": true,
            "token": VALID_TOKEN,
            "isNewUser": false
        })),
        _ => Json(json!({"success": false, "message": "Invalid Google token"})),
    }
}

async fn register_google(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.record("/api/register-google", &headers, body);
    Json(json!({"success": true, "token": VALID_TOKEN}))
}

// =============================================================================
// Payments
// =============================================================================

/// Gateway orders echo back the amount they were created with.
fn gateway_order(id: &str, body: &Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "order": {"id": id, "amount": body["amount"], "currency": "INR"}
    }))
}

async fn create_setup_order(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let response = gateway_order("order_setup", &body);
    recorded.record("/api/payment/create-order", &headers, body);
    response
}

async fn create_renewal_order(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let response = gateway_order("order_renewal", &body);
    recorded.record("/api/payment/createRenewalOrder", &headers, body);
    response
}

async fn verify_renewal(
    State(recorded): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let expected = format!("Bearer {VALID_TOKEN}");
    if header(&headers, "authorization").as_deref() != Some(expected.as_str()) {
        return failure(StatusCode::UNAUTHORIZED, "Not Authorized Login Again");
    }
    recorded.record("/api/payment/verifyRenewalPayment", &headers, body);
    Json(json!({"success": true, "message": "Subscription renewed"})).into_response()
}
