//! Cart commands backed by the HTTP catalog and file storage.

use rocket_cart::{
    CartConfig, CartStore, FileStore, HttpCatalog, TracingNotifier, UpdateProductAmount,
};
use rocket_cart_core::{Cart, ProductId};

type CliStore = CartStore<HttpCatalog, FileStore, TracingNotifier>;

fn open_store() -> Result<CliStore, Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let catalog = HttpCatalog::new(&config)?;
    let storage = FileStore::new(&config.storage_dir);
    Ok(CartStore::open_with_key(
        catalog,
        storage,
        TracingNotifier,
        config.storage_key,
    ))
}

/// Render the cart as tab-separated lines plus a totals footer.
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Carrinho vazio\n".to_string();
    }

    let mut out = String::new();
    for line in cart {
        out.push_str(&format!(
            "{}\t{}\t{} x {}\t{}\n",
            line.id,
            line.title,
            line.amount,
            line.price,
            line.line_total()
        ));
    }
    out.push_str(&format!(
        "Itens: {}\tTotal: {}\n",
        cart.item_count(),
        cart.subtotal()
    ));
    out
}

#[allow(clippy::print_stdout)]
fn print_cart(store: &CliStore) {
    print!("{}", render(store.cart()));
}

/// Print the persisted cart.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    print_cart(&store);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(product_id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store()?;
    store.add_product(product_id).await?;
    print_cart(&store);
    Ok(())
}

/// Remove a product's line.
pub fn remove(product_id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store()?;
    store.remove_product(product_id)?;
    print_cart(&store);
    Ok(())
}

/// Set a line's quantity.
pub async fn update(product_id: ProductId, amount: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store()?;
    store
        .update_product_amount(UpdateProductAmount {
            product_id,
            amount: i64::from(amount),
        })
        .await?;
    print_cart(&store);
    Ok(())
}
