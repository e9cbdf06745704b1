//! Catalog listing and cart editing commands.

use shopfront_cart::{CartStore, FileStore};
use shopfront_core::ProductId;

use super::{CommandError, Context};

/// List every catalog product with its stock.
#[allow(clippy::print_stdout)]
pub fn products(ctx: &Context) -> Result<(), CommandError> {
    let catalog = ctx.open_catalog()?;
    if catalog.products().is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    println!("{:<16} {:<28} {:>10} {:>6}", "ID", "NAME", "PRICE", "STOCK");
    for product in catalog.products() {
        let stock = if product.in_stock() {
            product.stock.to_string()
        } else {
            "sold out".to_string()
        };
        println!(
            "{:<16} {:<28} {:>10} {:>6}",
            product.id.as_str(),
            product.name,
            ctx.price(product.price).to_string(),
            stock
        );
    }
    Ok(())
}

/// Print the cart contents and totals.
pub fn show(ctx: &Context) {
    print_cart(ctx, &ctx.open_store());
}

/// Add one unit of a catalog product.
pub fn add(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let catalog = ctx.open_catalog()?;
    let product = catalog.product(&ProductId::new(id))?;

    let mut store = ctx.open_store();
    let before = store.total_items();
    store.add_item(product);
    if store.total_items() == before {
        tracing::warn!(product_id = %product.id, stock = product.stock, "Not enough stock to add");
    }
    print_cart(ctx, &store);
    Ok(())
}

pub fn update(ctx: &Context, id: &str, quantity: i64) {
    let mut store = ctx.open_store();
    store.update_quantity(&ProductId::new(id), quantity);
    print_cart(ctx, &store);
}

pub fn remove(ctx: &Context, id: &str) {
    let mut store = ctx.open_store();
    store.remove_item(&ProductId::new(id));
    print_cart(ctx, &store);
}

pub fn clear(ctx: &Context) {
    let mut store = ctx.open_store();
    store.clear_cart();
    print_cart(ctx, &store);
}

#[allow(clippy::print_stdout)]
fn print_cart(ctx: &Context, store: &CartStore<FileStore>) {
    if store.is_empty() {
        println!("Cart is empty.");
        return;
    }

    for line in store.lines() {
        println!(
            "{:<16} {:<28} {:>4} x {:>10} = {:>10}",
            line.id().as_str(),
            line.product.name,
            line.quantity,
            ctx.price(line.unit_price()).to_string(),
            ctx.price(line.line_total()).to_string()
        );
    }
    println!(
        "{} item(s), total {}",
        store.total_items(),
        ctx.price(store.total_amount())
    );
}
