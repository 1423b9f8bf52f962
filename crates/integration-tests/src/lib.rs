//! Integration test harness for the Solar Market client.
//!
//! [`FakeBackend`] is a small in-process stand-in for the marketplace REST
//! API, served by `axum` on an ephemeral port. It keeps one user's cart and
//! orders in memory, counts every request by `METHOD /path`, and can be
//! told to reject the session, rotate refresh tokens, or 404 specific routes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p solar-market-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! let provider = backend.logged_in_provider().await;
//! provider.add_to_cart(&"p1".into(), 2).await?;
//! assert_eq!(backend.hits("POST /cart/add"), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use solar_market_client::{ClientConfig, CommerceProvider, MemoryStorage};

/// Access token the fake backend issues at login.
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Refresh token the fake backend issues at login.
pub const REFRESH_TOKEN: &str = "test-refresh-token";

/// The only password reset token the backend accepts.
pub const RESET_TOKEN: &str = "test-reset-token";

/// Credentials of the only account.
pub const EMAIL: &str = "vendor@example.com";
pub const PASSWORD: &str = "sunshine";

type Reply = (StatusCode, Json<Value>);

#[derive(Debug, Default)]
struct BackendState {
    user: Value,
    /// Currently valid tokens
    access_token: String,
    refresh_token: String,
    /// Issue a new refresh token on every refresh
    rotate_refresh: bool,
    tokens_issued: u32,
    products: HashMap<String, Value>,
    categories: HashMap<String, Value>,
    /// `(product id, quantity)` in insertion order
    cart: Vec<(String, u32)>,
    orders: Vec<Value>,
    hits: HashMap<String, usize>,
    /// Routes (`METHOD /path`) that answer 404
    disabled: HashSet<String>,
    /// Reject every bearer token
    sessions_revoked: bool,
    cart_delay: Option<Duration>,
}

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    /// Start a backend seeded with two products, `p1` (120.00) and `p2`
    /// (35.50), and one category, `solar-panels`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));
        {
            let mut s = lock(&state);
            s.user = user_json();
            s.access_token = ACCESS_TOKEN.to_string();
            s.refresh_token = REFRESH_TOKEN.to_string();
            s.categories.insert(
                "solar-panels".into(),
                json!({ "_id": "solar-panels", "name": "Solar Panels", "description": "Monocrystalline and polycrystalline modules" }),
            );
            s.products.insert("p1".into(), product_json("p1", "Mono Panel 400W", "120.00"));
            s.products.insert("p2".into(), product_json("p2", "MC4 Connector Pair", "35.50"));
        }

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/logout", post(logout))
            .route("/auth/refresh", post(refresh))
            .route("/auth/verify-status", get(verify_status))
            .route("/auth/verify-email", get(verify_email))
            .route("/auth/forgot-password", post(forgot_password))
            .route("/auth/reset-password", post(reset_password))
            .route("/profile", get(profile).patch(update_profile))
            .route("/products", get(list_products).post(create_product))
            .route(
                "/products/{id}",
                get(get_product).patch(update_product).delete(delete_product),
            )
            .route("/categories", get(list_categories).post(create_category))
            .route(
                "/categories/{id}",
                get(get_category)
                    .patch(update_category)
                    .delete(delete_category),
            )
            .route("/cart", get(get_cart).post(add_to_cart))
            .route("/cart/add", post(add_to_cart))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart", post(add_to_cart))
            .route("/cart/item/{id}", delete(remove_item).patch(update_item))
            .route("/cart/clear", delete(clear_cart))
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/{id}", get(get_order).patch(update_order))
            .layer(middleware::from_fn_with_state(state.clone(), record_hit))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A provider pointed at this backend with in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the provider cannot be built.
    #[must_use]
    pub fn provider(&self) -> CommerceProvider {
        let config = ClientConfig::new(&self.url()).expect("Invalid fake backend URL");
        CommerceProvider::new(config, Arc::new(MemoryStorage::new()))
            .expect("Failed to build provider")
    }

    /// A provider that has already logged in.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    pub async fn logged_in_provider(&self) -> CommerceProvider {
        let provider = self.provider();
        provider
            .login(EMAIL, &PASSWORD.into())
            .await
            .expect("Login against fake backend failed");
        provider
    }

    /// How many requests hit `METHOD /path`, e.g. `"GET /products/p1"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.state).hits.get(route).copied().unwrap_or(0)
    }

    /// Forget all recorded hits.
    pub fn reset_hits(&self) {
        lock(&self.state).hits.clear();
    }

    /// Make `METHOD /path` answer 404.
    pub fn disable(&self, route: &str) {
        lock(&self.state).disabled.insert(route.to_string());
    }

    /// Reject every token from now on, as if the session expired server-side.
    pub fn revoke_sessions(&self) {
        lock(&self.state).sessions_revoked = true;
    }

    /// Issue a new refresh token with every refresh from now on.
    pub fn rotate_refresh_tokens(&self) {
        lock(&self.state).rotate_refresh = true;
    }

    /// The access token the backend currently accepts.
    #[must_use]
    pub fn access_token(&self) -> String {
        lock(&self.state).access_token.clone()
    }

    /// The refresh token the backend currently accepts.
    #[must_use]
    pub fn refresh_token(&self) -> String {
        lock(&self.state).refresh_token.clone()
    }

    /// Whether a product still exists server-side.
    #[must_use]
    pub fn has_product(&self, product_id: &str) -> bool {
        lock(&self.state).products.contains_key(product_id)
    }

    /// Slow down `GET /cart` so overlapping refreshes can be observed.
    pub fn delay_cart(&self, delay: Duration) {
        lock(&self.state).cart_delay = Some(delay);
    }

    /// Server-side quantity of a product in the cart.
    #[must_use]
    pub fn cart_quantity(&self, product_id: &str) -> u32 {
        lock(&self.state)
            .cart
            .iter()
            .find(|(id, _)| id == product_id)
            .map_or(0, |(_, quantity)| *quantity)
    }

    /// Put a line straight into the server-side cart.
    pub fn seed_cart(&self, product_id: &str, quantity: u32) {
        lock(&self.state).cart.push((product_id.to_string(), quantity));
    }

    /// Number of orders placed.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }
}

fn lock(state: &Mutex<BackendState>) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn product_json(id: &str, name: &str, price: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} for off-grid installs"),
        "price": price,
        "category": "solar-panels",
        "stock": 40,
        "images": [],
        "isActive": true
    })
}

fn user_json() -> Value {
    json!({
        "_id": "u1",
        "name": "Sunny Vendor",
        "email": EMAIL,
        "role": "vendor",
        "isEmailVerified": false,
        "vendorInfo": {
            "businessName": "Sunny Panels",
            "verificationStatus": "verified",
            "totalSales": "0",
            "totalOrders": 0
        }
    })
}

fn message(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

/// Merge the fields of `changes` into `target`.
fn merge(target: &mut Value, changes: Value) {
    if let (Some(target), Value::Object(changes)) = (target.as_object_mut(), changes) {
        target.extend(changes);
    }
}

/// Check the bearer token.
fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {}", state.access_token);
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if state.sessions_revoked || presented != Some(expected.as_str()) {
        return Err(message(StatusCode::UNAUTHORIZED, "Invalid or expired token"));
    }
    Ok(())
}

async fn record_hit(
    State(state): State<Arc<Mutex<BackendState>>>,
    request: Request,
    next: Next,
) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    let disabled = {
        let mut s = lock(&state);
        *s.hits.entry(route.clone()).or_default() += 1;
        s.disabled.contains(&route)
    };
    if disabled {
        return message(StatusCode::NOT_FOUND, "Route not found").into_response();
    }
    next.run(request).await
}

// ============================================================================
// Auth
// ============================================================================

async fn login(State(state): State<Arc<Mutex<BackendState>>>, Json(body): Json<Value>) -> Reply {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email != Some(EMAIL) || password != Some(PASSWORD) {
        return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let s = lock(&state);
    ok(json!({
        "accessToken": s.access_token,
        "refreshToken": s.refresh_token,
        "user": s.user
    }))
}

/// New accounts wait for email verification, so no tokens are issued.
async fn register(Json(body): Json<Value>) -> Reply {
    let Some(email) = body.get("email").and_then(Value::as_str) else {
        return message(StatusCode::BAD_REQUEST, "email is required");
    };
    if email == EMAIL {
        return message(StatusCode::CONFLICT, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful, please verify your email",
            "user": {
                "_id": "u2",
                "name": body.get("name").cloned().unwrap_or(Value::Null),
                "email": email,
                "role": body.get("role").cloned().unwrap_or_else(|| json!("customer")),
                "isEmailVerified": false
            }
        })),
    )
}

async fn logout() -> Reply {
    ok(json!({ "message": "Logged out" }))
}

async fn refresh(State(state): State<Arc<Mutex<BackendState>>>, Json(body): Json<Value>) -> Reply {
    let mut s = lock(&state);
    let presented = body.get("refreshToken").and_then(Value::as_str);
    if s.sessions_revoked || presented != Some(s.refresh_token.as_str()) {
        return message(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }

    s.tokens_issued += 1;
    s.access_token = format!("{ACCESS_TOKEN}-{}", s.tokens_issued);
    if s.rotate_refresh {
        s.refresh_token = format!("{REFRESH_TOKEN}-{}", s.tokens_issued);
        ok(json!({ "accessToken": s.access_token, "refreshToken": s.refresh_token }))
    } else {
        ok(json!({ "accessToken": s.access_token }))
    }
}

async fn verify_status(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    ok(json!({
        "isEmailVerified": s.user.get("isEmailVerified").cloned().unwrap_or(Value::Bool(false)),
        "email": EMAIL
    }))
}

async fn verify_email(
    State(state): State<Arc<Mutex<BackendState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    if params.get("token").is_none_or(String::is_empty) {
        return message(StatusCode::BAD_REQUEST, "Verification token is required");
    }
    merge(&mut lock(&state).user, json!({ "isEmailVerified": true }));
    ok(json!({ "message": "Email verified successfully" }))
}

async fn forgot_password() -> Reply {
    ok(json!({ "message": "If that account exists, a reset link is on its way" }))
}

async fn reset_password(Json(body): Json<Value>) -> Reply {
    if body.get("token").and_then(Value::as_str) != Some(RESET_TOKEN) {
        return message(StatusCode::BAD_REQUEST, "Invalid or expired reset token");
    }
    ok(json!({ "message": "Password has been reset" }))
}

async fn profile(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    ok(json!({ "user": s.user }))
}

async fn update_profile(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(changes): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    merge(&mut s.user, changes);
    ok(json!({ "user": s.user }))
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(State(state): State<Arc<Mutex<BackendState>>>) -> Reply {
    let s = lock(&state);
    let mut products: Vec<Value> = s.products.values().cloned().collect();
    products.sort_by_key(|p| p.get("_id").and_then(Value::as_str).map(str::to_string));
    let total = products.len();
    (
        StatusCode::OK,
        Json(json!({ "products": products, "total": total, "page": 1, "totalPages": 1 })),
    )
}

async fn get_product(
    State(state): State<Arc<Mutex<BackendState>>>,
    Path(id): Path<String>,
) -> Reply {
    match lock(&state).products.get(&id) {
        Some(product) => ok(product.clone()),
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn update_product(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let Some(product) = s.products.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    merge(product, changes);
    let product = product.clone();
    ok(json!({ "product": product }))
}

async fn create_product(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(mut product): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let id = format!("p{}", s.products.len() + 1);
    merge(&mut product, json!({ "_id": id, "isActive": true }));
    s.products.insert(id, product.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    )
}

async fn delete_product(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    match s.products.remove(&id) {
        Some(_) => ok(json!({ "message": "Product deleted" })),
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<Arc<Mutex<BackendState>>>) -> Reply {
    let s = lock(&state);
    let mut categories: Vec<Value> = s.categories.values().cloned().collect();
    categories.sort_by_key(|c| c.get("_id").and_then(Value::as_str).map(str::to_string));
    ok(json!({ "categories": categories }))
}

async fn get_category(
    State(state): State<Arc<Mutex<BackendState>>>,
    Path(id): Path<String>,
) -> Reply {
    match lock(&state).categories.get(&id) {
        Some(category) => ok(json!({ "category": category })),
        None => message(StatusCode::NOT_FOUND, "Category not found"),
    }
}

async fn create_category(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(mut category): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let id = format!("cat-{}", s.categories.len() + 1);
    merge(&mut category, json!({ "_id": id, "isActive": true }));
    s.categories.insert(id, category.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "category": category })),
    )
}

/// Answers without the category, like deployments that only acknowledge.
async fn update_category(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let Some(category) = s.categories.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Category not found");
    };
    merge(category, changes);
    ok(json!({ "message": "Category updated" }))
}

async fn delete_category(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    match s.categories.remove(&id) {
        Some(_) => ok(json!({ "message": "Category deleted" })),
        None => message(StatusCode::NOT_FOUND, "Category not found"),
    }
}

// ============================================================================
// Cart
// ============================================================================

async fn get_cart(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let delay = {
        let s = lock(&state);
        if let Err(reply) = authorize(&s, &headers) {
            return reply;
        }
        s.cart_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let s = lock(&state);
    let items: Vec<Value> = s
        .cart
        .iter()
        .map(|(id, quantity)| json!({ "_id": format!("line-{id}"), "productId": id, "quantity": quantity }))
        .collect();
    // Deliberately wrong totals: clients must compute their own
    ok(json!({ "_id": "cart-1", "items": items, "totalItems": 999, "subtotal": "0" }))
}

async fn add_to_cart(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let Some(product_id) = body.get("productId").and_then(Value::as_str).map(str::to_string) else {
        return message(StatusCode::BAD_REQUEST, "productId is required");
    };
    let quantity = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(1);

    match s.cart.iter_mut().find(|(id, _)| *id == product_id) {
        Some((_, existing)) => *existing += quantity,
        None => s.cart.push((product_id, quantity)),
    }
    ok(json!({ "message": "Added to cart" }))
}

async fn remove_item(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    s.cart.retain(|(product_id, _)| *product_id != id);
    ok(json!({ "message": "Removed" }))
}

async fn update_item(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let Some(quantity) = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
    else {
        return message(StatusCode::BAD_REQUEST, "quantity is required");
    };
    match s.cart.iter_mut().find(|(product_id, _)| *product_id == id) {
        Some((_, existing)) => {
            *existing = quantity;
            ok(json!({ "message": "Updated" }))
        }
        None => message(StatusCode::NOT_FOUND, "Item not in cart"),
    }
}

async fn clear_cart(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    s.cart.clear();
    ok(json!({ "message": "Cart cleared" }))
}

// ============================================================================
// Orders
// ============================================================================

async fn list_orders(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    ok(json!({ "orders": s.orders }))
}

async fn create_order(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let total: f64 = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    let price = item
                        .get("price")
                        .and_then(|p| p.as_str().and_then(|s| s.parse().ok()).or_else(|| p.as_f64()))
                        .unwrap_or(0.0);
                    let quantity = item.get("quantity").and_then(Value::as_f64).unwrap_or(0.0);
                    price * quantity
                })
                .sum()
        })
        .unwrap_or(0.0);

    let order = json!({
        "_id": format!("order-{}", s.orders.len() + 1),
        "user": "u1",
        "items": body.get("items").cloned().unwrap_or_else(|| json!([])),
        "shippingAddress": body.get("shippingAddress").cloned().unwrap_or(Value::Null),
        "paymentMethod": body.get("paymentMethod").cloned().unwrap_or(Value::Null),
        "status": "pending",
        "totalAmount": total
    });
    s.orders.push(order.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Order created", "order": order })),
    )
}

async fn get_order(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    match s.orders.iter().find(|order| order.get("_id").and_then(Value::as_str) == Some(id.as_str())) {
        Some(order) => ok(json!({ "order": order })),
        None => message(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn update_order(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Reply {
    let mut s = lock(&state);
    if let Err(reply) = authorize(&s, &headers) {
        return reply;
    }
    let Some(order) = s
        .orders
        .iter_mut()
        .find(|order| order.get("_id").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return message(StatusCode::NOT_FOUND, "Order not found");
    };
    merge(order, changes);
    let order = order.clone();
    ok(json!({ "order": order }))
}
