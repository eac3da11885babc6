//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart id lives in the session; the cart itself lives in the shared
//! [`CartStore`](crate::cart_store::CartStore).
//!
//! Adding returns the badge and fires `cart-changed` so the panel refreshes.
//! Removing and checkout return the panel and fire `cart-updated` so the
//! badge refreshes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use mercado_core::{Cart, Price, Product, ProductId, Translator};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{CART_CHANGED, CART_UPDATED, HX_TRIGGER};
use crate::error::{AppError, Result};
use crate::middleware::{Locale, OptionalToken};
use crate::models::session::{cart_id, ensure_cart_id};
use crate::services::checkout::checkout as submit_checkout;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
///
/// The product card posts the product it shows, so adding needs no catalog
/// lookup.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl From<AddToCartForm> for Product {
    fn from(form: AddToCartForm) -> Self {
        Self {
            id: form.id,
            title: form.title,
            price: form.price,
            image: form.image,
            category: form.category,
        }
    }
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: ProductId,
}

// =============================================================================
// Views
// =============================================================================

/// Cart entry display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub price: String,
    pub quantity: String,
}

/// Outcome message shown at the top of the panel.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartPanelTemplate {
    pub t: Translator,
    pub items: Vec<CartLineView>,
    pub total: String,
    pub notice: Option<Notice>,
}

impl CartPanelTemplate {
    #[must_use]
    pub fn new(t: Translator, cart: &Cart, notice: Option<Notice>) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| CartLineView {
                id: item.id(),
                title: item.title().to_string(),
                image: item.image().to_string(),
                price: item.price().to_string(),
                quantity: t.format("cart.quantity", &[("quantity", &item.quantity().to_string())]),
            })
            .collect();
        let total = t.format("cart.total", &[("total", &cart.total().to_string())]);

        Self {
            t,
            items,
            total,
            notice,
        }
    }
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart panel.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Locale(t): Locale,
) -> Result<CartPanelTemplate> {
    let cart = state.carts().snapshot(cart_id(&session).await?).await;
    Ok(CartPanelTemplate::new(t, &cart, None))
}

/// Get cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let count = state.carts().count(cart_id(&session).await?).await;
    Ok(CartCountTemplate { count })
}

/// Add item to cart (HTMX).
///
/// Starts a cart on first use. Returns the new badge, or 400 when the price
/// is out of range.
#[instrument(skip_all, fields(product_id = %form.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = ensure_cart_id(&session).await?;
    let count = state
        .carts()
        .add(id, form.into())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::debug!(count, "added to cart");

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_CHANGED)]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Remove every entry of a product (HTMX). Returns the panel.
#[instrument(skip_all, fields(product_id = %form.id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Locale(t): Locale,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let cart = match cart_id(&session).await? {
        Some(id) => state.carts().remove(id, form.id).await,
        None => Cart::new(),
    };

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        CartPanelTemplate::new(t, &cart, None),
    )
        .into_response())
}

/// Submit the cart (HTMX). Returns the panel with the outcome.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Locale(t): Locale,
    OptionalToken(token): OptionalToken,
) -> Result<Response> {
    let id = cart_id(&session).await?;

    let notice = match submit_checkout(state.api(), token.as_ref(), state.carts(), id).await {
        Ok(receipt) => Notice {
            text: receipt.user_message(&t),
            is_error: false,
        },
        Err(e) => Notice {
            text: e.user_message(&t),
            is_error: true,
        },
    };

    let cart = state.carts().snapshot(id).await;
    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        CartPanelTemplate::new(t, &cart, Some(notice)),
    )
        .into_response())
}
