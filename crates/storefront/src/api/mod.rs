//! Backend API client.
//!
//! # Architecture
//!
//! - The backend owns persistence, tokens, inventory and payment; this module
//!   only calls it over HTTP (`reqwest`)
//! - No caching: every catalog fetch goes to the backend
//! - Flows depend on the [`StoreApi`] trait so they can run against a fake
//!
//! # Endpoints
//!
//! ```text
//! POST /auth/login      {username, password}            -> {token}
//! POST /auth/signup     {name, email, username, ...}    -> {message?}
//! GET  /auth/products   [Authorization: Bearer]         -> [Product]
//! POST /auth/checkout   {products, totalItems, ...} + Bearer -> {message?}
//! ```
//!
//! Error responses carry `{"message": "..."}`; the message is surfaced
//! verbatim when present.

mod client;
pub mod types;

use std::future::Future;

use mercado_core::{CheckoutOrder, Product, Registration};
use thiserror::Error;

pub use client::BackendClient;
pub use types::{ApiMessage, LoginCredentials, SessionToken};

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: reqwest::StatusCode,
        message: Option<String>,
    },

    /// Success response that did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The backend's own message, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Operations the storefront needs from the backend.
pub trait StoreApi: Send + Sync {
    /// Exchange credentials for a session token.
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<SessionToken, ApiError>> + Send;

    /// Create an account.
    fn signup(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<ApiMessage, ApiError>> + Send;

    /// Fetch the catalog, attaching the bearer token when given.
    fn products(
        &self,
        token: Option<&SessionToken>,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Submit an order.
    fn checkout(
        &self,
        token: &SessionToken,
        order: &CheckoutOrder,
    ) -> impl Future<Output = Result<ApiMessage, ApiError>> + Send;
}
