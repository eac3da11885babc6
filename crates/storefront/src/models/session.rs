//! Session-stored state.
//!
//! The session holds only small handles: the id of the visitor's cart (the
//! cart itself lives in [`CartStore`](crate::cart_store::CartStore)) and the
//! in-progress registration wizard. The backend token is not stored here; it
//! travels in its own cookie.

use mercado_core::RegistrationWizard;
use tower_sessions::Session;

use crate::cart_store::CartId;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart id.
    pub const CART_ID: &str = "cart_id";

    /// Key for the registration wizard between steps.
    pub const REGISTRATION: &str = "registration";
}

/// The session's cart id, if a cart was ever started.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn cart_id(session: &Session) -> Result<Option<CartId>, tower_sessions::session::Error> {
    session.get::<CartId>(keys::CART_ID).await
}

/// The session's cart id, assigning a fresh one on first use.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn ensure_cart_id(session: &Session) -> Result<CartId, tower_sessions::session::Error> {
    if let Some(id) = cart_id(session).await? {
        return Ok(id);
    }
    let id = CartId::new_v4();
    session.insert(keys::CART_ID, id).await?;
    Ok(id)
}

/// The stored wizard, or a fresh one at step 1.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn registration(
    session: &Session,
) -> Result<RegistrationWizard, tower_sessions::session::Error> {
    Ok(session
        .get::<RegistrationWizard>(keys::REGISTRATION)
        .await?
        .unwrap_or_default())
}

/// Persist the wizard between steps.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_registration(
    session: &Session,
    wizard: &RegistrationWizard,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::REGISTRATION, wizard).await
}

/// Drop the wizard (after success, or when the form is reloaded).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_registration(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<RegistrationWizard>(keys::REGISTRATION)
        .await
        .map(|_| ())
}
