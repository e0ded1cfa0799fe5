//! Integration tests for BEE-Commerce.
//!
//! The tests run the client against [`MockBackend`], an in-process HTTP
//! server that mimics the storefront API: JWT login and refresh, the
//! paginated product catalog, checkout, orders, and the account profile.
//! Nothing external is needed; every test gets its own server on an
//! ephemeral port.
//!
//! Request counters on the backend let tests assert not just on results but
//! on the exact number of requests made, which is how the refresh-and-retry
//! bounds are verified.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Default credentials accepted by the mock backend.
pub const USERNAME: &str = "bee";
/// Password paired with [`USERNAME`].
pub const PASSWORD: &str = "hunter2";

/// How many requests of each kind the backend has served.
#[derive(Debug, Default)]
pub struct Counters {
    pub token: AtomicUsize,
    pub refresh: AtomicUsize,
    pub products: AtomicUsize,
    pub orders: AtomicUsize,
    pub checkout: AtomicUsize,
    pub profile: AtomicUsize,
}

struct BackendState {
    counters: Counters,
    /// Serial embedded in issued tokens; bumped on every issue.
    serial: AtomicU64,
    valid_access: Mutex<Option<String>>,
    valid_refresh: Mutex<Option<String>>,
    /// When set, every authenticated endpoint answers 401 no matter what.
    always_unauthorized: AtomicBool,
    /// When set, the refresh endpoint rejects the refresh token.
    fail_refresh: AtomicBool,
    /// When set, the product list is returned as a bare array instead of
    /// the paginated envelope.
    bare_product_list: AtomicBool,
    products: Vec<Value>,
    orders: Mutex<Vec<Value>>,
    order_seq: AtomicU64,
    profile: Mutex<Value>,
    /// Known accounts, username to password. Registration adds to this.
    users: Mutex<HashMap<String, String>>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            counters: Counters::default(),
            serial: AtomicU64::new(0),
            valid_access: Mutex::new(None),
            valid_refresh: Mutex::new(None),
            always_unauthorized: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            bare_product_list: AtomicBool::new(false),
            products: seed_products(),
            orders: Mutex::new(Vec::new()),
            order_seq: AtomicU64::new(0),
            profile: Mutex::new(json!({
                "id": 1,
                "username": USERNAME,
                "email": "bee@example.com",
                "first_name": null,
                "last_name": null,
            })),
            users: Mutex::new(HashMap::from([(
                USERNAME.to_string(),
                PASSWORD.to_string(),
            )])),
        }
    }

    /// Issue a fresh token pair and make it the only valid one.
    fn issue_tokens(&self) -> (String, String) {
        let serial = self.serial.fetch_add(1, Ordering::SeqCst) + 1;
        let access = make_jwt(serial);
        let refresh = format!("refresh-{serial}");
        *self.valid_access.lock().unwrap() = Some(access.clone());
        *self.valid_refresh.lock().unwrap() = Some(refresh.clone());
        (access, refresh)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        if self.always_unauthorized.load(Ordering::SeqCst) {
            return Err(unauthorized());
        }
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let valid = self.valid_access.lock().unwrap();
        match (presented, valid.as_deref()) {
            (Some(presented), Some(valid)) if presented == valid => Ok(()),
            _ => Err(unauthorized()),
        }
    }
}

/// A JWT-shaped token whose payload decodes to real claims. The signature
/// is garbage; the client never verifies it.
fn make_jwt(serial: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"user_id": 1, "username": USERNAME, "serial": serial}).to_string(),
    );
    format!("{header}.{payload}.sig{serial}")
}

fn seed_products() -> Vec<Value> {
    (1..=23)
        .map(|i| {
            let name = if i % 3 == 0 {
                format!("Honey Jar {i}")
            } else {
                format!("Beeswax Candle {i}")
            };
            json!({
                "id": i,
                "name": name,
                "description": null,
                "price": format!("{i}.50"),
                "stock": if i == 13 { 0 } else { 5 },
                "available": true,
                "category": {"id": 1 + (i % 2), "name": if i % 2 == 0 { "Food" } else { "Home" }},
            })
        })
        .collect()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

/// An in-process storefront backend bound to an ephemeral port.
pub struct MockBackend {
    state: Arc<BackendState>,
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend; each call gets its own port and state.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::new());
        let app = Router::new()
            .route("/api/token/", post(token))
            .route("/api/token/refresh/", post(refresh))
            .route("/api/accounts/register/", post(register))
            .route("/api/accounts/profile/", get(get_profile).patch(patch_profile))
            .route("/api/categories/", get(categories))
            .route("/api/products/", get(products))
            .route("/api/products/{id}/", get(product_detail))
            .route("/api/orders/", get(orders))
            .route("/api/checkout/", post(checkout))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self { state, addr, handle }
    }

    /// API root of this backend, e.g. `http://127.0.0.1:PORT/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Request counters for assertions.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.state.counters
    }

    /// Invalidate the current access token; the refresh token stays valid.
    /// The next authenticated request will see a 401.
    pub fn expire_access(&self) {
        *self.state.valid_access.lock().unwrap() = None;
    }

    /// Make every authenticated endpoint answer 401, refresh or not.
    pub fn set_always_unauthorized(&self, on: bool) {
        self.state.always_unauthorized.store(on, Ordering::SeqCst);
    }

    /// Make the refresh endpoint reject the refresh token.
    pub fn set_fail_refresh(&self, on: bool) {
        self.state.fail_refresh.store(on, Ordering::SeqCst);
    }

    /// Serve the product list as a bare array instead of the envelope.
    pub fn set_bare_product_list(&self, on: bool) {
        self.state.bare_product_list.store(on, Ordering::SeqCst);
    }

    /// The most recently placed order, as the backend recorded it.
    #[must_use]
    pub fn last_order(&self) -> Option<Value> {
        self.state.orders.lock().unwrap().last().cloned()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ===== Handlers =====

async fn token(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.counters.token.fetch_add(1, Ordering::SeqCst);
    let username = body.get("username").and_then(Value::as_str).unwrap_or("");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    let known = state
        .users
        .lock()
        .unwrap()
        .get(username)
        .is_some_and(|p| p == password);
    if known {
        let (access, refresh) = state.issue_tokens();
        (
            StatusCode::OK,
            axum::Json(json!({"access": access, "refresh": refresh})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);
    let presented = body.get("refresh").and_then(Value::as_str);
    let valid = state.valid_refresh.lock().unwrap().clone();
    let rejected = state.fail_refresh.load(Ordering::SeqCst)
        || presented.is_none()
        || presented != valid.as_deref();
    if rejected {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response();
    }

    let serial = state.serial.fetch_add(1, Ordering::SeqCst) + 1;
    let access = make_jwt(serial);
    *state.valid_access.lock().unwrap() = Some(access.clone());
    (StatusCode::OK, axum::Json(json!({"access": access}))).into_response()
}

async fn register(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let username = body.get("username").and_then(Value::as_str).unwrap_or("");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");

    let mut users = state.users.lock().unwrap();
    let mut errors = serde_json::Map::new();
    if users.contains_key(username) {
        errors.insert(
            "username".to_string(),
            json!(["A user with that username already exists."]),
        );
    }
    if password.len() < 8 {
        errors.insert(
            "password".to_string(),
            json!(["This password is too short. It must contain at least 8 characters."]),
        );
    }
    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, axum::Json(Value::Object(errors))).into_response();
    }

    users.insert(username.to_string(), password.to_string());
    (
        StatusCode::CREATED,
        axum::Json(json!({"id": users.len(), "username": username})),
    )
        .into_response()
}

async fn categories() -> Response {
    (
        StatusCode::OK,
        axum::Json(json!({
            "results": [
                {"id": 1, "name": "Home"},
                {"id": 2, "name": "Food"},
            ],
            "count": 2,
        })),
    )
        .into_response()
}

async fn products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.counters.products.fetch_add(1, Ordering::SeqCst);
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }

    let search = params.get("search").map(|s| s.to_lowercase());
    let category: Option<i64> = params.get("category_id").and_then(|s| s.parse().ok());
    let filtered: Vec<&Value> = state
        .products
        .iter()
        .filter(|p| {
            search.as_ref().is_none_or(|term| {
                p["name"].as_str().unwrap_or("").to_lowercase().contains(term)
            })
        })
        .filter(|p| category.is_none_or(|c| p["category"]["id"].as_i64() == Some(c)))
        .collect();

    if state.bare_product_list.load(Ordering::SeqCst) {
        return (StatusCode::OK, axum::Json(json!(filtered))).into_response();
    }

    let page: usize = params.get("page").and_then(|s| s.parse().ok()).unwrap_or(1);
    let page_size: usize = params
        .get("page_size")
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let start = page.saturating_sub(1) * page_size;
    if page > 1 && start >= filtered.len() {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"detail": "Invalid page."})),
        )
            .into_response();
    }
    let items: Vec<&Value> = filtered.iter().skip(start).take(page_size).copied().collect();
    (
        StatusCode::OK,
        axum::Json(json!({"results": items, "count": filtered.len()})),
    )
        .into_response()
}

async fn product_detail(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    state
        .products
        .iter()
        .find(|p| p["id"].as_i64() == Some(id))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    axum::Json(json!({"detail": "Not found."})),
                )
                    .into_response()
            },
            |p| (StatusCode::OK, axum::Json(p.clone())).into_response(),
        )
}

async fn orders(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.counters.orders.fetch_add(1, Ordering::SeqCst);
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let orders = state.orders.lock().unwrap().clone();
    let count = orders.len();
    (
        StatusCode::OK,
        axum::Json(json!({"results": orders, "count": count})),
    )
        .into_response()
}

async fn checkout(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.counters.checkout.fetch_add(1, Ordering::SeqCst);
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }

    let Some(items) = body.get("order_items").and_then(Value::as_array) else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"order_items": ["This field is required."]})),
        )
            .into_response();
    };
    if items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"order_items": ["This list may not be empty."]})),
        )
            .into_response();
    }

    let mut total = Decimal::ZERO;
    let mut order_items = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let product_id = item.get("product").and_then(Value::as_i64);
        let quantity = item.get("quantity").and_then(Value::as_u64).unwrap_or(0);
        let price: Decimal = item
            .get("price")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let Some(product) = state
            .products
            .iter()
            .find(|p| p["id"].as_i64() == product_id)
        else {
            return (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({"order_items": ["Invalid product."]})),
            )
                .into_response();
        };
        total += price * Decimal::from(quantity);
        order_items.push(json!({
            "id": i + 1,
            "product": product,
            "quantity": quantity,
            "price": price.to_string(),
        }));
    }

    let id = state.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
    let order = json!({
        "id": id,
        "total_amount": total.to_string(),
        "status": "pending",
        "status_display": "Pending",
        "ordered_at": chrono::Utc::now().to_rfc3339(),
        "items": order_items,
    });
    state.orders.lock().unwrap().push(order.clone());
    (StatusCode::CREATED, axum::Json(order)).into_response()
}

async fn get_profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.counters.profile.fetch_add(1, Ordering::SeqCst);
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let profile = state.profile.lock().unwrap().clone();
    (StatusCode::OK, axum::Json(profile)).into_response()
}

async fn patch_profile(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.counters.profile.fetch_add(1, Ordering::SeqCst);
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    if body.get("email").and_then(Value::as_str) == Some("taken@example.com") {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"email": ["This email address is already in use."]})),
        )
            .into_response();
    }

    let mut profile = state.profile.lock().unwrap();
    if let (Value::Object(target), Value::Object(patch)) = (&mut *profile, &body) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    (StatusCode::OK, axum::Json(profile.clone())).into_response()
}
