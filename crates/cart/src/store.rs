//! The owned cart store.
//!
//! [`CartStore`] wraps a [`CartState`] together with the storage slot it is
//! persisted to and the list of observers interested in changes. Every
//! operation is synchronous and total: invalid input is clamped or ignored,
//! never rejected.
//!
//! After each operation the store
//! 1. writes the full snapshot to storage (best effort: failures are logged
//!    and the in-memory state stays authoritative), then
//! 2. calls every subscriber if the state actually changed.

use std::fmt;

use rust_decimal::Decimal;
use shopfront_core::{Product, ProductId};
use tracing::instrument;

use crate::line::CartLine;
use crate::snapshot;
use crate::state::CartState;
use crate::storage::KeyValueStore;

/// Default storage key for the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "cart-storage";

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&CartState)>;

/// Client-side cart, persisted to a [`KeyValueStore`].
pub struct CartStore<S> {
    state: CartState,
    storage: S,
    key: String,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart stored under `key`, or start empty.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty cart; the
    /// problem is logged and not returned.
    #[instrument(skip(storage))]
    pub fn load(storage: S, key: &str) -> Self {
        let key = key.to_owned();
        let state = match storage.get(&key) {
            Ok(Some(raw)) => snapshot::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
                CartState::new()
            }),
            Ok(None) => CartState::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart snapshot, starting empty");
                CartState::new()
            }
        };

        tracing::debug!(
            lines = state.len(),
            total_items = state.total_items(),
            "Cart loaded"
        );

        Self {
            state,
            storage,
            key,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open the cart under [`DEFAULT_CART_KEY`].
    pub fn load_default(storage: S) -> Self {
        Self::load(storage, DEFAULT_CART_KEY)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add one unit of `product`, bounded by `product.stock`.
    ///
    /// Silently does nothing when the product is out of stock or the line is
    /// already at the stock bound.
    pub fn add_item(&mut self, product: &Product) {
        let changed = self.state.add_item(product);
        tracing::debug!(product_id = %product.id, changed, "add_item");
        self.after_mutation(changed);
    }

    /// Set the quantity of a line, clamped into `[1, stock]`.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        let changed = self.state.update_quantity(product_id, quantity);
        tracing::debug!(%product_id, quantity, changed, "update_quantity");
        self.after_mutation(changed);
    }

    /// Remove a line if present.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        let changed = self.state.remove_item(product_id);
        tracing::debug!(%product_id, changed, "remove_item");
        self.after_mutation(changed);
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        let changed = self.state.clear();
        tracing::debug!(changed, "clear_cart");
        self.after_mutation(changed);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.state.total_items()
    }

    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.state.total_amount()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// The storage backend the snapshot is written to.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Change notification
    // =========================================================================

    /// Register `observer` to be called with the new state after each change.
    pub fn subscribe(&mut self, observer: impl FnMut(&CartState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Stop notifying a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn after_mutation(&mut self, changed: bool) {
        self.persist();
        if changed {
            for (_, observer) in &mut self.observers {
                observer(&self.state);
            }
        }
    }

    /// Overwrite the stored snapshot with the current state.
    fn persist(&self) {
        let raw = match snapshot::encode(&self.state) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &raw) {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist cart snapshot");
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
