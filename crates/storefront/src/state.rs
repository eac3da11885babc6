//! Application state shared across handlers.

use std::sync::Arc;

use mercado_core::i18n::TranslationError;
use mercado_core::{Language, TranslationCatalog, Translator};

use crate::api::{ApiError, BackendClient};
use crate::cart_store::CartStore;
use crate::config::StorefrontConfig;
use crate::i18n::load_catalog;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error("translations: {0}")]
    Translations(#[from] TranslationError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and owns the backend client,
/// the cart store and the translation catalog.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: BackendClient,
    carts: CartStore,
    translations: Arc<TranslationCatalog>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a bundled
    /// translation file is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = BackendClient::new(&config.api)?;
        let translations = Arc::new(load_catalog()?);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                carts: CartStore::new(),
                translations,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &BackendClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// A translator for `language`.
    #[must_use]
    pub fn translator(&self, language: Language) -> Translator {
        Translator::new(Arc::clone(&self.inner.translations), language)
    }
}
