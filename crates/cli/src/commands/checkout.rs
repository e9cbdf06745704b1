//! Checkout commands.

use shopfront_cart::{CheckoutForm, CheckoutSummary};

use super::{CommandError, Context};

/// Print the amounts the checkout page would show.
pub fn summary(ctx: &Context) {
    let store = ctx.open_store();
    let summary = CheckoutSummary::from_state(store.state(), ctx.config.shipping_flat_rate);
    print_summary(ctx, &summary);
}

/// Submit the cart as an order for the signed-in user.
#[allow(clippy::print_stdout)]
pub fn place_order(ctx: &Context, form: &CheckoutForm) -> Result<(), CommandError> {
    let user = ctx.signed_in_user()?;
    let mut catalog = ctx.open_catalog()?;
    let mut store = ctx.open_store();

    let receipt = shopfront_cart::checkout(
        &mut store,
        &mut catalog,
        user,
        form,
        ctx.config.shipping_flat_rate,
    )?;

    println!("Order {} placed.", receipt.order_id);
    for line in &receipt.items {
        println!("  {} x {}", line.quantity, line.product.name);
    }
    print_summary(ctx, &receipt.summary);
    for issue in &receipt.stock_issues {
        println!(
            "Warning: stock for {} was not updated: {}",
            issue.product_id, issue.error
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(ctx: &Context, summary: &CheckoutSummary) {
    println!("Items:    {}", summary.item_count);
    println!("Subtotal: {}", ctx.price(summary.subtotal));
    println!("Shipping: {}", ctx.price(summary.shipping));
    println!("Total:    {}", ctx.price(summary.total));
}
