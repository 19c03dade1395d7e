//! Integration test support for Rocket Cart.
//!
//! Tests run against a live [`CatalogServer`] bound to an ephemeral port, so
//! they exercise the real HTTP client, routing and JSON encoding without any
//! external services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-cart-integration-tests
//! ```

use axum::Router;
use rocket_cart::CartConfig;
use rocket_cart::server::{CatalogSeed, CatalogServer, CatalogState};
use rocket_cart_core::{Price, Product, ProductId, Stock};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A catalog server running in the background of a test.
pub struct TestCatalog {
    pub base_url: String,
    pub state: CatalogState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), rocket_cart::server::ServerError>>,
}

impl TestCatalog {
    /// Start serving `seed` on `127.0.0.1` with a free port.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be bound.
    pub async fn start(seed: CatalogSeed) -> Self {
        let server = CatalogServer::bind(([127, 0, 0, 1], 0).into(), seed)
            .await
            .expect("Failed to bind catalog server");
        let addr = server.local_addr().expect("Failed to read bound address");
        let state = server.state();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async move {
            let _ = rx.await;
        }));

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(tx),
            handle,
        }
    }

    /// Cart configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> CartConfig {
        config_for(&self.base_url)
    }

    /// Current stock level of a product, as the server sees it.
    pub async fn stock_of(&self, id: i32) -> Option<u32> {
        self.state.stock(ProductId::new(id)).await.map(|s| s.amount)
    }

    /// Stop the server and wait for it to exit.
    ///
    /// # Panics
    ///
    /// Panics if the server task failed.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle)
            .await
            .expect("Catalog task panicked")
            .expect("Catalog server failed");
    }
}

/// Serve an arbitrary router on `127.0.0.1` with a free port.
///
/// Used to stand in for a catalog that misbehaves in ways the dev server
/// never does. The server runs until the test's runtime shuts down.
///
/// Returns the base URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn serve_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("Failed to bind stub catalog");
    let addr = listener.local_addr().expect("Failed to read bound address");

    tokio::spawn(async move { axum::serve(listener, router).await });

    format!("http://{addr}")
}

/// Cart configuration for a catalog at `base_url`, with defaults otherwise.
///
/// # Panics
///
/// Panics if `base_url` is not a valid http(s) URL.
#[must_use]
pub fn config_for(base_url: &str) -> CartConfig {
    let base_url = base_url.to_string();
    CartConfig::from_lookup(move |key| (key == "CART_API_URL").then(|| base_url.clone()))
        .expect("Invalid test configuration")
}

/// A seed with one product per `(id, stock)` pair, each priced R$ 179,90.
#[must_use]
pub fn seed(lines: &[(i32, u32)]) -> CatalogSeed {
    CatalogSeed {
        products: lines.iter().map(|&(id, _)| product(id)).collect(),
        stock: lines
            .iter()
            .map(|&(id, amount)| Stock {
                id: ProductId::new(id),
                amount,
            })
            .collect(),
    }
}

/// A catalog product record.
#[must_use]
pub fn product(id: i32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Tênis {id}"),
        price: Price::from_cents(17990),
        image: format!("https://cdn.example.com/tenis{id}.jpg"),
        amount: 0,
    }
}
