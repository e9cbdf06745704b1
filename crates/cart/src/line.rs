//! A single product entry in the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{Product, ProductId};

/// One product's entry in the cart.
///
/// Carries a snapshot of the product as it was when first added, so `stock`
/// here is the bound recorded at that time, not the live catalog value.
/// Serialized flat: product fields and `quantity` side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub(crate) fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.product.price
    }

    /// Recorded stock bound for this line.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.product.stock
    }

    /// `price * quantity` for this line, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or_else(|| {
                tracing::warn!(product_id = %self.product.id, "Line total overflow, saturating");
                Decimal::MAX
            })
    }
}
