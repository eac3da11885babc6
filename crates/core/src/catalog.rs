//! Catalog products and client-side category filtering.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Filter value that matches every category.
pub const ALL_PRODUCTS: &str = "all products";

/// A purchasable product as returned by the backend.
///
/// Products are replaced wholesale on every fetch; nothing mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub category: String,
}

impl Product {
    /// Case-insensitive title search. A blank query matches everything.
    #[must_use]
    pub fn title_matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Category predicate applied to an already-fetched product list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No filtering.
    #[default]
    All,
    /// Exact category label match.
    Only(String),
}

impl CategoryFilter {
    /// Parse a selection from the UI. Empty and `"all products"` select everything.
    #[must_use]
    pub fn parse(selection: &str) -> Self {
        let selection = selection.trim();
        if selection.is_empty() || selection == ALL_PRODUCTS {
            Self::All
        } else {
            Self::Only(selection.to_owned())
        }
    }

    /// Returns true if the product passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == *category,
        }
    }

    /// Products passing the filter, in catalog order.
    pub fn apply<'a>(&'a self, products: &'a [Product]) -> impl Iterator<Item = &'a Product> + 'a {
        products.iter().filter(move |p| self.matches(p))
    }

    /// The selected category label, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category),
        }
    }
}

/// Distinct category labels in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| *c == product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(1000),
            image: format!("https://img.example/{id}.png"),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_parse_all_selections() {
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("all products"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("electronics"),
            CategoryFilter::Only("electronics".to_string())
        );
    }

    #[test]
    fn test_apply_filters_by_exact_category() {
        let products = vec![
            product(1, "electronics"),
            product(2, "women's clothing"),
            product(3, "electronics"),
        ];

        let filter = CategoryFilter::parse("electronics");
        let ids: Vec<i64> = filter.apply(&products).map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(CategoryFilter::All.apply(&products).count(), 3);
        assert_eq!(CategoryFilter::parse("jewelery").apply(&products).count(), 0);
    }

    #[test]
    fn test_title_matches_ignores_case() {
        let p = product(7, "electronics");
        assert!(p.title_matches("product 7"));
        assert!(p.title_matches("PROD"));
        assert!(p.title_matches("  "));
        assert!(!p.title_matches("backpack"));
    }

    #[test]
    fn test_categories_distinct_in_order() {
        let products = vec![
            product(1, "b"),
            product(2, "a"),
            product(3, "b"),
        ];
        assert_eq!(categories(&products), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{"id":1,"title":"Backpack","price":109.95,"image":"https://img/1.jpg","category":"men's clothing"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(10995));
    }
}
