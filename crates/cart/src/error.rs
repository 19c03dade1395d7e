//! Cart operation errors.
//!
//! Every failed operation returns a `CartError` to the caller and raises the
//! matching [`Notice`] once. A failed operation never changes the cart.

use std::fmt;

use rocket_cart_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::notify::Notice;
use crate::storage::StorageError;

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddProduct,
    RemoveProduct,
    UpdateProductAmount,
}

impl Operation {
    /// Notice raised when this operation fails for a reason other than stock.
    #[must_use]
    pub const fn failure_notice(self) -> Notice {
        match self {
            Self::AddProduct => Notice::AddFailed,
            Self::RemoveProduct => Notice::RemoveFailed,
            Self::UpdateProductAmount => Notice::UpdateFailed,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AddProduct => "add product",
            Self::RemoveProduct => "remove product",
            Self::UpdateProductAmount => "update product amount",
        })
    }
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The catalog cannot supply the requested quantity.
    #[error("product {product_id} out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The catalog answered with a different product than requested.
    #[error("catalog returned product {received} for product {requested}")]
    ProductMismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// The product has no line in the cart.
    #[error("{op} failed: product {product_id} is not in the cart")]
    NotInCart { op: Operation, product_id: ProductId },

    /// A catalog call made before the commit failed.
    #[error("{op} failed: {source}")]
    Catalog {
        op: Operation,
        #[source]
        source: CatalogError,
    },

    /// The commit could not be persisted.
    #[error("{op} failed: {source}")]
    Storage {
        op: Operation,
        #[source]
        source: StorageError,
    },
}

impl CartError {
    /// The notice shown to the user for this error.
    #[must_use]
    pub const fn notice(&self) -> Notice {
        match self {
            Self::OutOfStock { .. } => Notice::OutOfStock,
            Self::ProductMismatch { .. } => Notice::AddFailed,
            Self::NotInCart { op, .. } | Self::Catalog { op, .. } | Self::Storage { op, .. } => {
                op.failure_notice()
            }
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
