//! Integration tests for Mercado.
//!
//! Every test starts two servers on ephemeral ports: a mock of the backend
//! API and a real storefront pointed at it. Requests go over TCP through the
//! full middleware stack, so sessions, cookies and the rate limiter all
//! behave as in production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mercado-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mercado_core::Language;
use mercado_storefront::config::{BackendApiConfig, SessionGuardConfig, StorefrontConfig};
use mercado_storefront::state::AppState;
use reqwest::{Client, RequestBuilder, redirect};
use serde_json::{Value, json};

/// Password the mock backend accepts for every user.
pub const GOOD_PASSWORD: &str = "secret";

// =============================================================================
// Mock Backend
// =============================================================================

/// Recorded traffic and switches for the mock backend.
#[derive(Default)]
pub struct MockBackend {
    pub signups: Mutex<Vec<Value>>,
    pub orders: Mutex<Vec<Value>>,
    pub product_calls: AtomicUsize,
    /// When set, checkout answers 500 with a message.
    pub fail_checkout: AtomicBool,
}

impl MockBackend {
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.orders.lock().unwrap().clone()
    }

    #[must_use]
    pub fn signups(&self) -> Vec<Value> {
        self.signups.lock().unwrap().clone()
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn mock_login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"] == GOOD_PASSWORD {
        Json(json!({ "token": format!("tok-{username}") })).into_response()
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn mock_signup(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    mock.signups.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({ "message": "User created" }))).into_response()
}

async fn mock_products(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    mock.product_calls.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers).is_none() {
        return rejected(StatusCode::UNAUTHORIZED, "Missing token");
    }
    Json(json!([
        {"id": 1, "title": "Backpack", "price": 109.95, "image": "https://img.example/1.png", "category": "men's clothing"},
        {"id": 2, "title": "Silver Ring", "price": 10.5, "image": "https://img.example/2.png", "category": "jewelery"},
        {"id": 3, "title": "Rain Jacket", "price": 39.99, "image": "https://img.example/3.png", "category": "men's clothing"}
    ]))
    .into_response()
}

async fn mock_checkout(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return rejected(StatusCode::UNAUTHORIZED, "Missing token");
    }
    if mock.fail_checkout.load(Ordering::SeqCst) {
        return rejected(StatusCode::INTERNAL_SERVER_ERROR, "Out of stock");
    }
    mock.orders.lock().unwrap().push(body);
    Json(json!({ "message": "Order received" })).into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

// =============================================================================
// Test Context
// =============================================================================

/// A running storefront wired to a mock backend.
pub struct TestContext {
    pub base_url: String,
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
    pub backend: Arc<MockBackend>,
}

impl TestContext {
    /// Start both servers.
    pub async fn new() -> Self {
        let backend = Arc::new(MockBackend::default());
        let backend_router = Router::new()
            .route("/auth/login", post(mock_login))
            .route("/auth/signup", post(mock_signup))
            .route("/auth/products", get(mock_products))
            .route("/auth/checkout", post(mock_checkout))
            .with_state(Arc::clone(&backend));
        let backend_addr = serve(backend_router).await;

        let config = StorefrontConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: BackendApiConfig {
                base_url: format!("http://{backend_addr}").parse().unwrap(),
                timeout: Duration::from_secs(5),
            },
            guard: SessionGuardConfig::default(),
            default_language: Language::En,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).unwrap();
        let addr = serve(mercado_storefront::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            client,
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A GET marked as an HTMX request.
    #[must_use]
    pub fn htmx_get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).header("hx-request", "true")
    }

    /// A POST marked as an HTMX request.
    #[must_use]
    pub fn htmx_post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).header("hx-request", "true")
    }

    /// Log in as `username` and return the login response.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.htmx_post("/auth/login")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    /// Add a product the way a catalog card does.
    pub async fn add_to_cart(&self, id: &str, title: &str, price: &str) -> reqwest::Response {
        self.htmx_post("/cart/add")
            .form(&[
                ("id", id),
                ("title", title),
                ("price", price),
                ("image", "https://img.example/x.png"),
                ("category", "misc"),
            ])
            .send()
            .await
            .unwrap()
    }
}
