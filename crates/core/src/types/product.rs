//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product as served by the hosted catalog.
///
/// Shopfront treats these as read-only snapshots: `stock` is the number of
/// units available when the record was fetched and may be stale by the time
/// it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price, never negative.
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Units available at fetch time.
    pub stock: u32,
}

impl Product {
    /// Whether any units were available when this record was fetched.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
