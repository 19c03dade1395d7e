//! HTTP catalog client.
//!
//! Uses `reqwest` for JSON requests against the catalog base URL.
//! Products are cached using `moka` (default 5-minute TTL); stock is never
//! cached because every cart mutation must see the current level.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocket_cart_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogError, RemoteCatalog, StockUpdate};
use crate::config::CartConfig;

/// Maximum number of products held in the cache.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Retry hint used when a 429 carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Client for the catalog REST API.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| CatalogError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(PRODUCT_CACHE_CAPACITY)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: config.api_url.clone(),
                products,
            }),
        })
    }

    /// The catalog base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached product.
    pub fn invalidate_products(&self) {
        if let Some(cache) = &self.inner.products {
            cache.invalidate_all();
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// Execute a PUT request, ignoring the response body.
    async fn put<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), CatalogError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.put(url).json(body).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(parse_error(response).await)
    }
}

impl RemoteCatalog for HttpCatalog {
    /// Served from the product cache when enabled, so a title or price can
    /// be up to `product_cache_ttl` old. Call [`HttpCatalog::invalidate_products`]
    /// or set the TTL to zero to always hit the catalog.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get(&format!("products/{id}")).await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.get(&format!("stock/{id}")).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn set_stock(&self, id: ProductId, amount: u32) -> Result<(), CatalogError> {
        self.put(&format!("stock/{id}"), &StockUpdate { amount }).await
    }
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("base_url", &self.inner.base_url.as_str())
            .field("product_cache", &self.inner.products.is_some())
            .finish_non_exhaustive()
    }
}

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CatalogError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Map a non-success response to a `CatalogError`.
async fn parse_error(response: reqwest::Response) -> CatalogError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return CatalogError::RateLimited(retry_after);
    }

    if status == 401 || status == 403 {
        return CatalogError::Unauthorized;
    }

    if status == 404 {
        return CatalogError::NotFound(response.url().path().to_string());
    }

    let message = response
        .text()
        .await
        .map(|body| body.chars().take(200).collect())
        .unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!(status, message = %message, "Catalog returned non-success status");

    CatalogError::Api { status, message }
}
