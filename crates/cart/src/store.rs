//! The cart store.
//!
//! [`CartStore`] owns the in-memory [`Cart`] and keeps it in step with a
//! [`PersistedStore`] and a [`RemoteCatalog`]:
//!
//! - The cart is loaded once when the store is opened.
//! - Each mutation builds a candidate cart, persists it, and only then
//!   replaces the in-memory cart (the *commit*). A failure anywhere before
//!   the commit leaves both copies untouched.
//! - After a commit, mutations that consume stock overwrite the remote stock
//!   level. That write is not rolled back if it fails; it is logged and the
//!   operation still succeeds.
//!
//! Mutations take `&mut self`, so operations on one store never interleave.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use rocket_cart::{CartConfig, CartStore, HttpCatalog, MemoryStore, ToastQueue};
//! use rocket_cart_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let mut store = CartStore::open(
//!     HttpCatalog::new(&config)?,
//!     MemoryStore::new(),
//!     ToastQueue::new(),
//! );
//!
//! store.add_product(ProductId::new(1)).await?;
//! println!("{} item(s)", store.cart().item_count());
//! # Ok(())
//! # }
//! ```

use std::num::NonZeroU32;

use rocket_cart_core::{Cart, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::RemoteCatalog;
use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::{CartError, Operation, Result};
use crate::notify::Notifier;
use crate::storage::{PersistedStore, StorageError};

/// Request to change the quantity of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested quantity. Values below 1 are ignored.
    pub amount: i64,
}

/// Shopping cart synchronized with a catalog and persisted storage.
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    key: String,
    cart: Cart,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: RemoteCatalog,
    S: PersistedStore,
    N: Notifier,
{
    /// Open a store persisted under the default key.
    pub fn open(catalog: C, storage: S, notifier: N) -> Self {
        Self::open_with_key(catalog, storage, notifier, DEFAULT_STORAGE_KEY)
    }

    /// Open a store persisted under `key`.
    ///
    /// The cart starts empty if the key is absent, unreadable, or does not
    /// hold a valid cart.
    pub fn open_with_key(catalog: C, storage: S, notifier: N, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = load_cart(&storage, &key);
        info!(key = %key, lines = cart.len(), "Cart loaded");

        Self {
            catalog,
            storage,
            notifier,
            key,
            cart,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Add one unit of a product.
    ///
    /// Fetches the product and its stock concurrently. A new product gets a
    /// line with amount 1; an existing line is incremented. After the commit
    /// the remote stock is set to one less than the fetched level.
    ///
    /// Product data comes from the catalog, which may answer from a cache;
    /// stock is always fetched fresh.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the catalog has no units left
    /// - [`CartError::ProductMismatch`] if the catalog returns another product
    /// - [`CartError::Catalog`] if either fetch fails
    /// - [`CartError::Storage`] if the commit cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<()> {
        let result = self.try_add_product(product_id).await;
        self.report(result)
    }

    async fn try_add_product(&mut self, product_id: ProductId) -> Result<()> {
        let op = Operation::AddProduct;

        let (product, stock) = tokio::try_join!(
            self.catalog.product(product_id),
            self.catalog.stock(product_id)
        )
        .map_err(|source| CartError::Catalog { op, source })?;

        if !stock.covers(1) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: 1,
                available: stock.amount,
            });
        }

        if product.id != product_id {
            return Err(CartError::ProductMismatch {
                requested: product_id,
                received: product.id,
            });
        }

        let mut next = self.cart.clone();
        let amount = next.add_one(product);
        self.commit(op, next)?;
        debug!(amount, "Product added");

        self.write_stock(product_id, stock.remaining_after(1)).await;
        Ok(())
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotInCart`] if the product has no line
    /// - [`CartError::Storage`] if the commit cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<()> {
        let result = self.try_remove_product(product_id);
        self.report(result)
    }

    fn try_remove_product(&mut self, product_id: ProductId) -> Result<()> {
        let op = Operation::RemoveProduct;

        let mut next = self.cart.clone();
        if next.remove(product_id).is_none() {
            return Err(CartError::NotInCart { op, product_id });
        }

        self.commit(op, next)?;
        debug!("Product removed");
        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// An amount below 1 is ignored: nothing is fetched, stored or reported.
    /// Otherwise the stock is fetched and, if it covers the amount, the line
    /// is overwritten and the remote stock is set to the fetched level minus
    /// the amount.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotInCart`] if the product has no line (no remote calls are made)
    /// - [`CartError::OutOfStock`] if the amount exceeds the available stock
    /// - [`CartError::Catalog`] if the stock fetch fails
    /// - [`CartError::Storage`] if the commit cannot be persisted
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&mut self, request: UpdateProductAmount) -> Result<()> {
        let clamped =
            u32::try_from(request.amount.clamp(0, i64::from(u32::MAX))).unwrap_or(u32::MAX);
        let Some(amount) = NonZeroU32::new(clamped) else {
            debug!("Ignoring update to a non-positive amount");
            return Ok(());
        };

        let result = self.try_update_product_amount(request.product_id, amount).await;
        self.report(result)
    }

    async fn try_update_product_amount(
        &mut self,
        product_id: ProductId,
        amount: NonZeroU32,
    ) -> Result<()> {
        let op = Operation::UpdateProductAmount;

        if !self.cart.contains(product_id) {
            return Err(CartError::NotInCart { op, product_id });
        }

        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|source| CartError::Catalog { op, source })?;

        if !stock.covers(amount.get()) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount.get(),
                available: stock.amount,
            });
        }

        let mut next = self.cart.clone();
        next.set_amount(product_id, amount);
        self.commit(op, next)?;
        debug!("Product amount updated");

        self.write_stock(product_id, stock.remaining_after(amount.get()))
            .await;
        Ok(())
    }

    /// Persist `next`, then make it the current cart.
    fn commit(&mut self, op: Operation, next: Cart) -> Result<()> {
        let encode = |source: serde_json::Error| CartError::Storage {
            op,
            source: StorageError::Encode(source),
        };
        let payload = serde_json::to_string(&next).map_err(encode)?;

        self.storage
            .set(&self.key, &payload)
            .map_err(|source| CartError::Storage { op, source })?;

        self.cart = next;
        Ok(())
    }

    /// Overwrite the remote stock level after a commit.
    ///
    /// Failures are logged only; the committed cart stays as it is.
    async fn write_stock(&self, product_id: ProductId, remaining: u32) {
        if let Err(e) = self.catalog.set_stock(product_id, remaining).await {
            warn!(
                product_id = %product_id,
                remaining,
                error = %e,
                "Stock update failed after commit; catalog stock not adjusted"
            );
        }
    }

    /// Raise the notice for a failed operation.
    fn report(&self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            warn!(error = %e, "Cart operation failed");
            self.notifier.notify(e.notice());
        }
        result
    }
}

impl<C, S, N> std::fmt::Debug for CartStore<C, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

/// Read the persisted cart, falling back to an empty cart.
fn load_cart(storage: &impl PersistedStore, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted cart; starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key = %key, error = %e, "Persisted cart is invalid; starting empty");
        Cart::new()
    })
}
