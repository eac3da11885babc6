//! Cart entries, totals and the checkout order built from them.
//!
//! # Duplicate products
//!
//! Adding a product that is already in the cart appends a new entry with
//! quantity 1 instead of bumping the existing entry. Removal by product id
//! drops every entry for that product. Each entry carries its own [`LineId`]
//! so a checkout can remove exactly the entries it submitted.
//!
//! # Price bounds
//!
//! Entries are priced between zero and [`MAX_UNIT_PRICE`], and an add that
//! would push the total past what a decimal can hold is refused. Totals of a
//! cart built through [`Cart::add_item`] therefore always fit.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Identifier of a single cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// A fresh random line id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Highest unit price the cart accepts.
pub const MAX_UNIT_PRICE: Price =
    Price::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

/// Why a product could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("price must not be negative")]
    NegativePrice,

    #[error("price exceeds the per-item limit")]
    PriceTooHigh,

    #[error("cart total out of range")]
    TotalOverflow,
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    line_id: LineId,
    product: Product,
    quantity: u32,
}

impl CartItem {
    fn new(product: Product) -> Self {
        Self {
            line_id: LineId::new(),
            product,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn line_id(&self) -> LineId {
        self.line_id
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.product.title
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.product.image
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.product.price
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.product.price.checked_times(self.quantity)
    }
}

/// The in-memory cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append `product` as a new entry with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] and leaves the cart unchanged when the price is
    /// negative, above [`MAX_UNIT_PRICE`], or would overflow the total.
    pub fn add_item(&mut self, product: Product) -> Result<LineId, CartError> {
        if product.price.is_negative() {
            return Err(CartError::NegativePrice);
        }
        if product.price > MAX_UNIT_PRICE {
            return Err(CartError::PriceTooHigh);
        }
        let item = CartItem::new(product);
        item.line_total()
            .zip(self.checked_total())
            .and_then(|(line, total)| total.checked_add(line))
            .ok_or(CartError::TotalOverflow)?;

        let line_id = item.line_id;
        self.items.push(item);
        Ok(line_id)
    }

    /// Remove every entry for `id`. Returns how many entries were removed.
    pub fn remove_item(&mut self, id: ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        before - self.items.len()
    }

    /// Remove the entries with the given line ids. Unknown ids are ignored.
    pub fn remove_lines(&mut self, lines: &[LineId]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !lines.contains(&item.line_id));
        before - self.items.len()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of entries (not the sum of quantities).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ price × quantity over the current entries.
    ///
    /// Saturates at the largest price instead of overflowing; `add_item`
    /// keeps that out of reach.
    #[must_use]
    pub fn total(&self) -> Price {
        self.checked_total().unwrap_or(Price::MAX)
    }

    fn checked_total(&self) -> Option<Price> {
        self.items
            .iter()
            .try_fold(Price::ZERO, |total, item| total.checked_add(item.line_total()?))
    }

    /// Build the checkout request body for the current contents.
    #[must_use]
    pub fn checkout_order(&self) -> CheckoutOrder {
        CheckoutOrder {
            products: self
                .items
                .iter()
                .map(|item| CheckoutLine {
                    id: item.id(),
                    quantity: item.quantity,
                    price: item.price(),
                })
                .collect(),
            total_items: self.items.len(),
            price_total: self.total(),
            lines: self.items.iter().map(|item| item.line_id).collect(),
        }
    }
}

/// Product projection sent to the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLine {
    pub id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Checkout request body: `{products, totalItems, priceTotal}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub products: Vec<CheckoutLine>,
    pub total_items: usize,
    pub price_total: Price,
    #[serde(skip)]
    lines: Vec<LineId>,
}

impl CheckoutOrder {
    /// Cart entries this order was built from.
    #[must_use]
    pub fn submitted_lines(&self) -> &[LineId] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            image: String::new(),
            category: "electronics".to_string(),
        }
    }

    fn expected_total(cart: &Cart) -> Price {
        let mut total = Price::ZERO;
        for item in cart.items() {
            let line = item.price().checked_times(item.quantity()).unwrap();
            total = total.checked_add(line).unwrap();
        }
        total
    }

    #[test]
    fn test_example_scenario() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1000)).unwrap();
        cart.add_item(product(2, 500)).unwrap();
        assert_eq!(cart.total(), Price::from_cents(1500));

        assert_eq!(cart.remove_item(ProductId::new(1)), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().unwrap().id(), ProductId::new(2));
        assert_eq!(cart.total(), Price::from_cents(500));
    }

    #[test]
    fn test_add_appends_duplicates_with_quantity_one() {
        let mut cart = Cart::new();
        let first = cart.add_item(product(1, 1000)).unwrap();
        let second = cart.add_item(product(1, 1000)).unwrap();

        assert_ne!(first, second);
        assert_eq!(cart.len(), 2);
        assert!(cart.items().iter().all(|item| item.quantity() == 1));
        assert_eq!(cart.total(), Price::from_cents(2000));

        // Removing by product id drops both entries
        assert_eq!(cart.remove_item(ProductId::new(1)), 2);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1000)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.remove_item(ProductId::new(99)), 0);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_total_matches_fold_over_operation_sequences() {
        let mut cart = Cart::new();
        let ops: &[(bool, i64, i64)] = &[
            (true, 1, 1999),
            (true, 2, 5),
            (true, 1, 1999),
            (false, 3, 0),
            (true, 3, 12345),
            (false, 1, 0),
            (true, 4, 1),
            (false, 2, 0),
            (false, 4, 0),
            (false, 3, 0),
        ];

        for &(add, id, cents) in ops {
            if add {
                cart.add_item(product(id, cents)).unwrap();
            } else {
                cart.remove_item(ProductId::new(id));
            }
            assert_eq!(cart.total(), expected_total(&cart));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_out_of_range_prices_are_refused() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1000)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.add_item(product(2, -1)), Err(CartError::NegativePrice));

        let mut huge = product(3, 0);
        huge.price = Price::MAX;
        assert_eq!(cart.add_item(huge), Err(CartError::PriceTooHigh));

        let mut over = product(4, 0);
        over.price = MAX_UNIT_PRICE.checked_add(Price::from_cents(1)).unwrap();
        assert_eq!(cart.add_item(over), Err(CartError::PriceTooHigh));

        assert_eq!(cart, before);
        assert_eq!(cart.total(), Price::from_cents(1000));

        let mut ceiling = product(5, 0);
        ceiling.price = MAX_UNIT_PRICE;
        cart.add_item(ceiling.clone()).unwrap();
        cart.add_item(ceiling).unwrap();
        assert_eq!(cart.total(), expected_total(&cart));
    }

    #[test]
    fn test_total_never_panics_on_overflowing_entries() {
        // Entries that bypass add_item's bounds still produce a total
        let mut huge = product(1, 0);
        huge.price = Price::MAX;
        let cart = Cart {
            items: vec![CartItem::new(huge.clone()), CartItem::new(huge)],
        };
        assert_eq!(cart.total(), Price::MAX);
        assert_eq!(cart.checkout_order().price_total, Price::MAX);
    }

    #[test]
    fn test_remove_lines_leaves_other_entries() {
        let mut cart = Cart::new();
        let a = cart.add_item(product(1, 100)).unwrap();
        let b = cart.add_item(product(1, 100)).unwrap();
        cart.add_item(product(2, 200)).unwrap();

        assert_eq!(cart.remove_lines(&[a, LineId::new()]), 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items().first().unwrap().line_id(), b);
    }

    #[test]
    fn test_checkout_order_body() {
        let mut cart = Cart::new();
        cart.add_item(product(2, 500)).unwrap();
        let order = cart.checkout_order();

        assert_eq!(order.submitted_lines().len(), 1);
        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(body["totalItems"], 1);
        assert!((body["priceTotal"].as_f64().unwrap() - 5.0).abs() < f64::EPSILON);
        let line = &body["products"][0];
        assert_eq!(line["id"], 2);
        assert_eq!(line["quantity"], 1);
        assert!((line["price"].as_f64().unwrap() - 5.0).abs() < f64::EPSILON);
        assert!(body.get("lines").is_none());
    }

    #[test]
    fn test_empty_cart_order() {
        let order = Cart::new().checkout_order();
        assert!(order.is_empty());
        assert_eq!(order.total_items, 0);
        assert_eq!(order.price_total, Price::ZERO);
    }
}
