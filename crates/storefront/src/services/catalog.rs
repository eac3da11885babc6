//! Catalog fetch.
//!
//! One request per view: the product list is never cached, and each fetch
//! replaces the previous list wholesale.

use mercado_core::{CategoryFilter, Product, Translator, catalog};
use tracing::{instrument, warn};

use super::describe_api_error;
use crate::api::{ApiError, SessionToken, StoreApi};

/// What the catalog view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    /// Fetch not finished; the page shell renders this and lazy-loads the rest.
    Loading,
    Failed { message: String },
    Loaded { products: Vec<Product> },
}

impl CatalogState {
    /// Map a fetch result to a view state.
    #[must_use]
    pub fn from_fetch(result: Result<Vec<Product>, ApiError>, t: &Translator) -> Self {
        match result {
            Ok(products) => Self::Loaded { products },
            Err(err) => {
                warn!(error = %err, "catalog fetch failed");
                Self::Failed {
                    message: describe_api_error(&err, t, "catalog.fetchFailed"),
                }
            }
        }
    }

    /// Products passing `filter`. Empty unless loaded.
    #[must_use]
    pub fn visible<'a>(&'a self, filter: &'a CategoryFilter) -> Vec<&'a Product> {
        match self {
            Self::Loaded { products } => filter.apply(products).collect(),
            Self::Loading | Self::Failed { .. } => Vec::new(),
        }
    }

    /// Distinct categories in the loaded list.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        match self {
            Self::Loaded { products } => catalog::categories(products),
            Self::Loading | Self::Failed { .. } => Vec::new(),
        }
    }
}

/// Fetch the product list, attaching the bearer token when present.
#[instrument(skip(api, token, t), fields(authenticated = token.is_some()))]
pub async fn fetch_catalog<A: StoreApi>(
    api: &A,
    token: Option<&SessionToken>,
    t: &Translator,
) -> CatalogState {
    CatalogState::from_fetch(api.products(token).await, t)
}
