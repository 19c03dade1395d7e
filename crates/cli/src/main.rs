//! Rocket Cart CLI - cart operations and a development catalog server.
//!
//! # Usage
//!
//! ```bash
//! # Serve the dev catalog from a db.json seed
//! rc-cli serve --seed crates/cli/db.json
//!
//! # Add product 1, then set its quantity to 3
//! rc-cli add 1
//! rc-cli update 1 3
//!
//! # Print the cart
//! rc-cli show
//!
//! # Remove product 1
//! rc-cli remove 1
//! ```
//!
//! Cart commands read `CART_*` variables (see `rocket_cart::config`) and keep
//! the cart in `CART_STORAGE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocket_cart_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rc-cli")]
#[command(author, version, about = "Rocket Cart CLI tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,
        /// New quantity (0 is ignored)
        amount: u32,
    },
    /// Serve the development catalog
    Serve {
        /// Catalog seed in db.json layout
        #[arg(short, long, default_value = "db.json")]
        seed: PathBuf,

        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:3333")]
        addr: SocketAddr,
    },
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_cart=info,rc_cli=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::cart::show()?,
        Commands::Add { product_id } => commands::cart::add(product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(product_id)?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(product_id, amount).await?;
        }
        Commands::Serve { seed, addr } => commands::serve::run(&seed, addr).await?,
    }
    Ok(())
}
