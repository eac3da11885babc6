//! In-memory [`StoreApi`] for flow tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use mercado_core::{CheckoutOrder, Product, Registration};
use reqwest::StatusCode;

use crate::api::{ApiError, ApiMessage, LoginCredentials, SessionToken, StoreApi};
use crate::cart_store::{CartId, CartStore};

/// Canned backend reply: success payload or `(status, message)` rejection.
pub type Reply<T> = Result<T, (StatusCode, Option<String>)>;

fn reply<T: Clone>(reply: &Reply<T>) -> Result<T, ApiError> {
    reply.clone().map_err(|(status, message)| ApiError::Rejected { status, message })
}

/// Fake backend that records every call.
pub struct FakeApi {
    pub login_reply: Reply<String>,
    pub signup_reply: Reply<Option<String>>,
    pub products_reply: Reply<Vec<Product>>,
    pub checkout_reply: Reply<Option<String>>,
    pub calls: AtomicUsize,
    pub last_order: Mutex<Option<CheckoutOrder>>,
    pub last_signup: Mutex<Option<Registration>>,
    pub last_products_token: Mutex<Option<String>>,
    /// Added to this cart while a checkout request is in flight.
    pub add_during_checkout: Option<(CartStore, CartId, Product)>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            login_reply: Ok("token-123".to_string()),
            signup_reply: Ok(None),
            products_reply: Ok(Vec::new()),
            checkout_reply: Ok(None),
            calls: AtomicUsize::new(0),
            last_order: Mutex::new(None),
            last_signup: Mutex::new(None),
            last_products_token: Mutex::new(None),
            add_during_checkout: None,
        }
    }
}

impl FakeApi {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl StoreApi for FakeApi {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<SessionToken, ApiError> {
        self.record();
        let raw = reply(&self.login_reply)?;
        SessionToken::new(raw).ok_or(ApiError::Rejected {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        })
    }

    async fn signup(&self, registration: &Registration) -> Result<ApiMessage, ApiError> {
        self.record();
        *self.last_signup.lock().unwrap() = Some(registration.clone());
        reply(&self.signup_reply).map(|message| ApiMessage { message })
    }

    async fn products(&self, token: Option<&SessionToken>) -> Result<Vec<Product>, ApiError> {
        self.record();
        *self.last_products_token.lock().unwrap() = token.map(|t| t.expose().to_string());
        reply(&self.products_reply)
    }

    async fn checkout(
        &self,
        _token: &SessionToken,
        order: &CheckoutOrder,
    ) -> Result<ApiMessage, ApiError> {
        self.record();
        *self.last_order.lock().unwrap() = Some(order.clone());
        if let Some((carts, id, product)) = &self.add_during_checkout {
            carts.add(*id, product.clone()).await.unwrap();
        }
        reply(&self.checkout_reply).map(|message| ApiMessage { message })
    }
}
