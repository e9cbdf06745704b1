//! Shopfront cart library.
//!
//! The client-side cart: a stock-bounded selection of catalog products with
//! derived totals, persisted as a single snapshot in a key-value store and
//! restored on load. Page-level code owns a [`CartStore`] and drives it
//! through four operations; everything else (catalog, orders, auth) lives on
//! the hosted platform.
//!
//! # Modules
//!
//! - [`state`] - Pure cart state and its reducer rules
//! - [`store`] - Owned store: persistence hook and change notification
//! - [`storage`] - Key-value storage backends
//! - [`snapshot`] - Persisted snapshot layout
//! - [`checkout`] - Order summary and submission
//! - [`session`] - Auth session changes that reset the cart
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod line;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod store;

pub use checkout::{
    CheckoutError, CheckoutForm, CheckoutSummary, CustomerDetails, OrderDraft, OrderItem,
    OrderReceipt, OrderSink, OrderStatus, StockIssue, checkout,
};
pub use config::{CartConfig, ConfigError};
pub use error::{Error, Result};
pub use line::CartLine;
pub use session::{SessionEvent, SessionStatus, SessionSync};
pub use snapshot::SnapshotError;
pub use state::CartState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, DEFAULT_CART_KEY, SubscriptionId};
