//! Development catalog server command.

use std::net::SocketAddr;
use std::path::Path;

use rocket_cart::server::{CatalogSeed, CatalogServer, ServerError};

/// Serve the catalog seeded from `seed` until Ctrl+C or SIGTERM.
pub async fn run(seed: &Path, addr: SocketAddr) -> Result<(), ServerError> {
    let seed = CatalogSeed::from_path(seed)?;
    tracing::info!(
        products = seed.products.len(),
        stock = seed.stock.len(),
        "Catalog seed loaded"
    );

    let server = CatalogServer::bind(addr, seed).await?;
    server.serve(shutdown_signal()).await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping catalog");
}
