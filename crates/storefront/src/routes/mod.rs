//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Login page (`?mode=register` for the wizard)
//! GET  /home                   - Catalog shell (requires token)
//! GET  /catalog                - Product list fragment (HTMX, requires token)
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel
//! POST /cart/add               - Add to cart (returns badge, triggers cart-changed)
//! POST /cart/remove            - Remove product (returns panel, triggers cart-updated)
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /checkout               - Submit the cart (returns panel with a notice)
//!
//! # Session
//! GET  /session/check          - Guard poll (204 or HX-Redirect)
//! POST /language               - Switch UI language
//!
//! # Auth
//! POST /auth/login             - Login action (rate limited)
//! POST /auth/register          - Registration wizard step (rate limited)
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod home;
pub mod language;
pub mod session;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use mercado_core::Language;

use crate::middleware::auth_rate_limiter;
use crate::middleware::token::HX_REDIRECT;
use crate::state::AppState;

/// HTMX response header that fires client-side events.
pub const HX_TRIGGER: &str = "hx-trigger";

/// HTMX response header that makes the client reload the page.
pub const HX_REFRESH: &str = "hx-refresh";

/// Event telling the cart badge to refresh.
pub const CART_UPDATED: &str = "cart-updated";

/// Event telling the cart panel to refresh.
pub const CART_CHANGED: &str = "cart-changed";

// =============================================================================
// Shared Page Chrome
// =============================================================================

/// One entry of the language selector.
#[derive(Debug, Clone)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

/// Data every full page needs for the shared layout.
#[derive(Debug, Clone)]
pub struct Layout {
    /// `lang` attribute of the document.
    pub lang: &'static str,
    /// Path the language selector returns to.
    pub path: String,
    pub languages: Vec<LanguageOption>,
}

impl Layout {
    #[must_use]
    pub fn new(current: Language, path: &str) -> Self {
        Self {
            lang: current.code(),
            path: path.to_string(),
            languages: Language::ALL
                .into_iter()
                .map(|language| LanguageOption {
                    code: language.code(),
                    name: language.native_name(),
                    selected: language == current,
                })
                .collect(),
        }
    }
}

/// Send the browser to `to`: `HX-Redirect` for HTMX, `303` otherwise.
pub(crate) fn navigate(to: &str, htmx: bool) -> Response {
    if htmx {
        (StatusCode::NO_CONTENT, [(HX_REDIRECT, to.to_string())]).into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
///
/// Login and registration share the per-IP limiter; logout is not limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Signed-out entry
        .route("/", get(auth::index))
        // Guarded catalog
        .route("/home", get(home::home))
        .route("/catalog", get(catalog::fragment))
        // Cart routes
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        // Session guard and preferences
        .route("/session/check", get(session::check))
        .route("/language", post(language::switch))
        // Auth routes
        .nest("/auth", auth_routes())
}
