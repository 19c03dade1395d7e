//! Development catalog server.
//!
//! Serves the catalog endpoints from an in-memory seed so the cart can be
//! exercised without the real backend. The seed uses the `db.json` layout of
//! a json-server mock:
//!
//! ```json
//! {
//!   "products": [{ "id": 1, "title": "...", "price": 179.9, "image": "..." }],
//!   "stock": [{ "id": 1, "amount": 3 }]
//! }
//! ```
//!
//! # Routes
//!
//! - `GET /products/{id}`
//! - `GET /stock/{id}`
//! - `PUT /stock/{id}` - overwrite the amount, echo the record

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    routing::get,
};
use rocket_cart_core::{Product, ProductId, Stock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::StockUpdate;

/// Errors starting the dev catalog server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid seed: {0}")]
    Seed(#[from] serde_json::Error),
}

/// Catalog contents in `db.json` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub stock: Vec<Stock>,
}

impl CatalogSeed {
    /// Read a seed file.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Shared, mutable catalog contents.
///
/// Cheaply cloneable; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    inner: Arc<RwLock<CatalogData>>,
}

#[derive(Debug, Default)]
struct CatalogData {
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
}

impl CatalogState {
    #[must_use]
    pub fn new(seed: CatalogSeed) -> Self {
        let data = CatalogData {
            products: seed.products.into_iter().map(|p| (p.id, p)).collect(),
            stock: seed.stock.into_iter().map(|s| (s.id, s.amount)).collect(),
        };
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.inner.read().await.products.get(&id).cloned()
    }

    pub async fn stock(&self, id: ProductId) -> Option<Stock> {
        self.inner
            .read()
            .await
            .stock
            .get(&id)
            .map(|&amount| Stock { id, amount })
    }

    /// Overwrite a stock level. Returns `None` for unknown products.
    pub async fn set_stock(&self, id: ProductId, amount: u32) -> Option<Stock> {
        let mut data = self.inner.write().await;
        let slot = data.stock.get_mut(&id)?;
        *slot = amount;
        Some(Stock { id, amount })
    }
}

/// Build the catalog router.
pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/products/{id}", get(get_product))
        .route("/stock/{id}", get(get_stock).put(put_stock))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_product(
    State(state): State<CatalogState>,
    UrlPath(id): UrlPath<ProductId>,
) -> Result<Json<Product>, StatusCode> {
    state.product(id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn get_stock(
    State(state): State<CatalogState>,
    UrlPath(id): UrlPath<ProductId>,
) -> Result<Json<Stock>, StatusCode> {
    state.stock(id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn put_stock(
    State(state): State<CatalogState>,
    UrlPath(id): UrlPath<ProductId>,
    Json(update): Json<StockUpdate>,
) -> Result<Json<Stock>, StatusCode> {
    state
        .set_stock(id, update.amount)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// A bound, not yet serving, catalog server.
pub struct CatalogServer {
    listener: TcpListener,
    state: CatalogState,
}

impl CatalogServer {
    /// Bind to `addr`. Port 0 picks a free port; see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Io` if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, seed: CatalogSeed) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: CatalogState::new(seed),
        })
    }

    /// The address actually bound.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Io` if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle on the served data.
    #[must_use]
    pub fn state(&self) -> CatalogState {
        self.state.clone()
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Io` if the server fails.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("catalog listening on {addr}");
        }

        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
