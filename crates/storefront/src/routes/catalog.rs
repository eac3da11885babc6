//! Catalog route handlers.
//!
//! The home shell renders the loading state and lazy-loads this fragment,
//! which fetches the product list once per request. Category and title
//! filters are applied to the fetched list; changing them refetches.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use mercado_core::{CategoryFilter, Product, ProductId, Translator};
use serde::Deserialize;
use tracing::instrument;

use crate::middleware::{Locale, RequireToken};
use crate::services::catalog::{CatalogState, fetch_catalog};
use crate::state::AppState;

/// Catalog filters from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Category label; empty or `all products` shows everything.
    #[serde(default)]
    pub category: String,
    /// Title search.
    #[serde(default)]
    pub q: String,
}

/// Category selector entry.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub label: String,
    pub selected: bool,
}

/// Product card display data.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub category: String,
    /// Plain decimal amount for the add-to-cart form.
    pub price: String,
    /// Formatted price, e.g. `$9.99`.
    pub price_label: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            price: product.price.amount().to_string(),
            price_label: product.price.to_string(),
        }
    }
}

/// Everything the catalog partial shows.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    pub loading: bool,
    pub error: Option<String>,
    pub all_selected: bool,
    pub categories: Vec<CategoryOption>,
    pub products: Vec<ProductCard>,
}

impl CatalogView {
    /// Build the view for `state` with the given filters applied.
    #[must_use]
    pub fn new(state: &CatalogState, filter: &CategoryFilter, query: &str, t: &Translator) -> Self {
        match state {
            CatalogState::Loading => Self {
                loading: true,
                ..Self::default()
            },
            CatalogState::Failed { message } => Self {
                error: Some(t.format("error", &[("message", message)])),
                ..Self::default()
            },
            CatalogState::Loaded { .. } => Self {
                loading: false,
                error: None,
                all_selected: filter.selected().is_none(),
                categories: state
                    .categories()
                    .into_iter()
                    .map(|label| CategoryOption {
                        selected: filter.selected() == Some(label.as_str()),
                        label,
                    })
                    .collect(),
                products: state
                    .visible(filter)
                    .into_iter()
                    .filter(|product| product.title_matches(query))
                    .map(ProductCard::from)
                    .collect(),
            },
        }
    }
}

/// Catalog fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/catalog.html")]
pub struct CatalogTemplate {
    pub t: Translator,
    pub catalog: CatalogView,
}

/// Fetch and render the product list.
#[instrument(skip_all, fields(category = %query.category))]
pub async fn fragment(
    State(state): State<AppState>,
    RequireToken(token): RequireToken,
    Locale(t): Locale,
    Query(query): Query<CatalogQuery>,
) -> CatalogTemplate {
    let catalog = fetch_catalog(state.api(), Some(&token), &t).await;
    let filter = CategoryFilter::parse(&query.category);
    let view = CatalogView::new(&catalog, &filter, &query.q, &t);
    tracing::debug!(shown = view.products.len(), "catalog rendered");

    CatalogTemplate { t, catalog: view }
}
