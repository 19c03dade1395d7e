//! Remote catalog: the source of truth for products and stock.
//!
//! # Endpoints
//!
//! - `GET /products/{id}` - product record
//! - `GET /stock/{id}` - units available
//! - `PUT /stock/{id}` with `{"amount": n}` - overwrite units available
//!
//! [`RemoteCatalog`] is the seam the cart store depends on. [`HttpCatalog`]
//! is the production implementation; tests substitute in-memory fakes.

mod http;

pub use http::HttpCatalog;

use std::future::Future;
use std::sync::Arc;

use rocket_cart_core::{Product, ProductId, Stock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catalog rejected the credentials.
    #[error("Unauthorized: invalid API token")]
    Unauthorized,

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Body of a stock overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub amount: u32,
}

/// Read products and stock, and overwrite stock, by product id.
pub trait RemoteCatalog: Send + Sync {
    /// Fetch a product record.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch the units currently available for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Overwrite the units available for a product.
    fn set_stock(
        &self,
        id: ProductId,
        amount: u32,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

impl<T: RemoteCatalog> RemoteCatalog for Arc<T> {
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send {
        (**self).product(id)
    }

    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send {
        (**self).stock(id)
    }

    fn set_stock(
        &self,
        id: ProductId,
        amount: u32,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send {
        (**self).set_stock(id, amount)
    }
}
