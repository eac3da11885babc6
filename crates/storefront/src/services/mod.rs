//! Flows that drive the backend API.
//!
//! # Services
//!
//! - `auth` - Login and the registration wizard
//! - `catalog` - Product list fetch and its view state
//! - `checkout` - Submitting the cart
//!
//! Every flow is generic over [`StoreApi`](crate::api::StoreApi) and reports
//! failures as values for the triggering view to render; nothing retries.

pub mod auth;
pub mod catalog;
pub mod checkout;

#[cfg(test)]
pub(crate) mod fake;

use mercado_core::Translator;

use crate::api::ApiError;

/// User-facing text for a backend failure.
///
/// The backend's own message wins; transport failures get the network
/// message; anything else gets the translation at `generic_key`.
#[must_use]
pub fn describe_api_error(err: &ApiError, t: &Translator, generic_key: &str) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match err {
        ApiError::Transport(_) => t.text("errors.network").to_string(),
        _ => t.text(generic_key).to_string(),
    }
}
