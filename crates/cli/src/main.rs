//! Shopfront CLI - Drive the client-side cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog and the cart
//! shopfront products
//! shopfront show
//!
//! # Change the cart
//! shopfront add 3f2a
//! shopfront update 3f2a 4
//! shopfront remove 3f2a
//! shopfront clear
//!
//! # Sign in, check out, sign out
//! shopfront login 7f8c2a9e-1b6d-4d43-9a51-2f0c1e7d9b33
//! shopfront checkout --name "Ana Ruiz" --email ana@example.com \
//!     --address "Calle 1, Madrid" --card 4242424242424242 --expiry 09/29 --cvv 123
//! shopfront logout
//! ```
//!
//! # Environment Variables
//!
//! See `shopfront_cart::config` for `SHOPFRONT_*` settings. `RUST_LOG`
//! controls log output (default: `shopfront_cart=info,shopfront=info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod catalog;
mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront cart tools")]
struct Cli {
    /// Product catalog JSON file
    #[arg(long, global = true, default_value = "catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products,
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Set the quantity of a cart line
    Update {
        /// Product ID
        id: String,
        /// Requested quantity (clamped to the available stock)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Show subtotal, shipping and total
    Summary,
    /// Place an order for the cart contents
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
        /// Card number (payment is simulated)
        #[arg(long)]
        card: String,
        /// Card expiry, MM/YY
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
    },
    /// Sign in as a platform user
    Login {
        /// User ID (UUID)
        user_id: String,
    },
    /// Sign out and clear the cart
    Logout,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cart=info,shopfront=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::from_env(cli.catalog)?;

    match cli.command {
        Commands::Products => commands::cart::products(&ctx)?,
        Commands::Show => commands::cart::show(&ctx),
        Commands::Add { id } => commands::cart::add(&ctx, &id)?,
        Commands::Update { id, quantity } => commands::cart::update(&ctx, &id, quantity),
        Commands::Remove { id } => commands::cart::remove(&ctx, &id),
        Commands::Clear => commands::cart::clear(&ctx),
        Commands::Summary => commands::checkout::summary(&ctx),
        Commands::Checkout {
            name,
            email,
            address,
            card,
            expiry,
            cvv,
        } => {
            let form = shopfront_cart::CheckoutForm {
                customer_name: name,
                customer_email: email,
                shipping_address: address,
                card_number: card,
                expiry,
                cvv,
            };
            commands::checkout::place_order(&ctx, &form)?;
        }
        Commands::Login { user_id } => commands::session::login(&ctx, &user_id)?,
        Commands::Logout => commands::session::logout(&ctx),
    }
    Ok(())
}
