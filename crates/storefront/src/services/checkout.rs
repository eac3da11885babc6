//! Checkout: submit the cart and clear what was submitted.
//!
//! The order is built from a snapshot of the cart. On success only the
//! entries in that snapshot are removed, so anything added while the request
//! was in flight stays in the cart. On failure the cart is untouched. There
//! is no retry and no idempotency key.

use mercado_core::Translator;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::describe_api_error;
use crate::api::{ApiError, SessionToken, StoreApi};
use crate::cart_store::{CartId, CartStore};
use crate::error::add_breadcrumb;

/// Why a checkout did not go through.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No session token; nothing was sent.
    #[error("missing session token")]
    MissingToken,

    /// Nothing to submit; nothing was sent.
    #[error("cart is empty")]
    EmptyCart,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message for the cart panel.
    #[must_use]
    pub fn user_message(&self, t: &Translator) -> String {
        match self {
            Self::MissingToken => t.text("checkout.missingToken").to_string(),
            Self::EmptyCart => t.text("checkout.emptyCart").to_string(),
            Self::Api(err) => describe_api_error(err, t, "checkout.error"),
        }
    }
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// The backend's message, if it sent a non-blank one.
    pub message: Option<String>,
    /// Entries submitted.
    pub submitted: usize,
    /// Entries removed from the cart afterwards.
    pub removed: usize,
}

impl CheckoutReceipt {
    /// Message for the cart panel.
    #[must_use]
    pub fn user_message(&self, t: &Translator) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| t.text("checkout.success").to_string())
    }
}

/// Submit the cart `cart_id`.
///
/// # Errors
///
/// Returns [`CheckoutError::MissingToken`] or [`CheckoutError::EmptyCart`]
/// without contacting the backend, or [`CheckoutError::Api`] when the
/// backend call fails.
#[instrument(skip(api, token, carts))]
pub async fn checkout<A: StoreApi>(
    api: &A,
    token: Option<&SessionToken>,
    carts: &CartStore,
    cart_id: Option<CartId>,
) -> Result<CheckoutReceipt, CheckoutError> {
    let token = token.ok_or(CheckoutError::MissingToken)?;
    let cart_id = cart_id.ok_or(CheckoutError::EmptyCart)?;

    let order = carts.order(cart_id).await;
    if order.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let submitted = order.submitted_lines().len();
    let items = order.total_items.to_string();
    let total = order.price_total.to_string();
    add_breadcrumb(
        "checkout",
        "Checkout submitted",
        Some(&[("items", items.as_str()), ("total", total.as_str())]),
    );

    let reply = api.checkout(token, &order).await.inspect_err(|err| {
        warn!(error = %err, "checkout rejected");
    })?;

    let removed = carts.remove_lines(cart_id, order.submitted_lines()).await;
    info!(submitted, removed, "checkout completed");

    Ok(CheckoutReceipt {
        message: reply.message.filter(|message| !message.trim().is_empty()),
        submitted,
        removed,
    })
}
