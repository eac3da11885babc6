//! Server-side carts keyed by the cart id stored in each session.
//!
//! Each cart sits behind its own `tokio::sync::Mutex`. Mutations hold the
//! lock for their whole duration and readers clone a snapshot under the same
//! lock, so a half-applied update is never observable. Idle carts expire
//! with the session.

use std::sync::Arc;
use std::time::Duration;

use mercado_core::{Cart, CartError, CheckoutOrder, LineId, Product, ProductId};
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Cart identifier stored in the session.
pub type CartId = Uuid;

/// Carts are dropped after this long without access (matches session expiry).
pub const CART_IDLE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const MAX_CARTS: u64 = 100_000;

/// In-memory cart store.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<CartId, Arc<Mutex<Cart>>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("carts", &self.carts.entry_count())
            .finish()
    }
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let carts = Cache::builder()
            .max_capacity(MAX_CARTS)
            .time_to_idle(CART_IDLE_EXPIRY)
            .build();
        Self { carts }
    }

    /// The cart for `id`, created empty on first use.
    async fn cart(&self, id: CartId) -> Arc<Mutex<Cart>> {
        self.carts
            .get_with(id, async { Arc::new(Mutex::new(Cart::new())) })
            .await
    }

    /// A consistent copy of the cart. Unknown or absent ids read as empty.
    pub async fn snapshot(&self, id: Option<CartId>) -> Cart {
        let Some(id) = id else {
            return Cart::new();
        };
        match self.carts.get(&id).await {
            Some(cart) => cart.lock().await.clone(),
            None => Cart::new(),
        }
    }

    /// Number of entries in the cart.
    pub async fn count(&self, id: Option<CartId>) -> usize {
        let Some(id) = id else {
            return 0;
        };
        match self.carts.get(&id).await {
            Some(cart) => cart.lock().await.len(),
            None => 0,
        }
    }

    /// Append `product` and return the new entry count.
    ///
    /// # Errors
    ///
    /// Returns the [`CartError`] from [`Cart::add_item`]; the cart is left
    /// as it was.
    pub async fn add(&self, id: CartId, product: Product) -> Result<usize, CartError> {
        let cart = self.cart(id).await;
        let mut cart = cart.lock().await;
        let line = cart.add_item(product)?;
        debug!(cart_id = %id, line_id = %line, "cart line added");
        Ok(cart.len())
    }

    /// Remove every entry for `product` and return the cart afterwards.
    pub async fn remove(&self, id: CartId, product: ProductId) -> Cart {
        let cart = self.cart(id).await;
        let mut cart = cart.lock().await;
        let removed = cart.remove_item(product);
        debug!(cart_id = %id, product_id = %product, removed, "cart lines removed");
        cart.clone()
    }

    /// Checkout body built from a snapshot of the cart.
    pub async fn order(&self, id: CartId) -> CheckoutOrder {
        self.snapshot(Some(id)).await.checkout_order()
    }

    /// Remove exactly `lines` in one locked operation.
    pub async fn remove_lines(&self, id: CartId, lines: &[LineId]) -> usize {
        let Some(cart) = self.carts.get(&id).await else {
            return 0;
        };
        let mut cart = cart.lock().await;
        cart.remove_lines(lines)
    }
}
