//! Cart state and the rules for changing it.
//!
//! [`CartState`] is a plain value: an ordered list of lines keyed by product
//! id. Totals are never stored; they are recomputed from the lines on every
//! read so they cannot drift from the line collection.
//!
//! The mutating methods are crate-private. Outside this crate the only way to
//! change a cart is through [`CartStore`](crate::CartStore), which persists
//! and notifies after each change.

use rust_decimal::Decimal;
use serde::Serialize;
use shopfront_core::{Product, ProductId};

use crate::line::CartLine;

/// The user's pending selection of products.
///
/// Serializes as `{ "items": [...] }`, the persisted snapshot layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    items: Vec<CartLine>,
}

impl CartState {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a state from lines, keeping the first line for any repeated id.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut items: Vec<CartLine> = Vec::new();
        for line in lines {
            if !items.iter().any(|existing| existing.id() == line.id()) {
                items.push(line);
            }
        }
        Self { items }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id() == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price * quantity` across all lines, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(CartLine::line_total)
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .unwrap_or_else(|| {
                tracing::warn!(lines = self.items.len(), "Cart total overflow, saturating");
                Decimal::MAX
            })
    }

    /// Add one unit of `product`.
    ///
    /// An existing line grows by one only while it stays within
    /// `product.stock`; a new line is created only when `product.stock > 0`.
    /// Returns whether anything changed.
    pub(crate) fn add_item(&mut self, product: &Product) -> bool {
        if let Some(line) = self.line_mut(&product.id) {
            if line.quantity < product.stock {
                line.quantity += 1;
                return true;
            }
            return false;
        }

        if product.stock == 0 {
            return false;
        }
        self.items.push(CartLine::new(product.clone()));
        true
    }

    /// Set a line's quantity to `min(max(1, quantity), stock)` using the
    /// line's recorded stock. Returns whether anything changed.
    pub(crate) fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };

        let stock = line.stock();
        let clamped = quantity.max(1).min(i64::from(stock));
        let clamped = u32::try_from(clamped).unwrap_or(stock);
        if line.quantity == clamped {
            return false;
        }
        line.quantity = clamped;
        true
    }

    /// Drop the line for `product_id`. Returns whether a line was removed.
    pub(crate) fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id() != product_id);
        self.items.len() != before
    }

    /// Drop every line. Returns whether the cart had any lines.
    pub(crate) fn clear(&mut self) -> bool {
        let had_lines = !self.items.is_empty();
        self.items.clear();
        had_lines
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.items.iter_mut().find(|line| line.id() == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: &str, price: Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            image_url: None,
            category: "general".to_string(),
            stock,
        }
    }

    fn assert_totals_consistent(state: &CartState) {
        let items: u64 = state.lines().iter().map(|l| u64::from(l.quantity)).sum();
        let amount = state
            .lines()
            .iter()
            .map(|l| l.product.price * Decimal::from(l.quantity))
            .sum::<Decimal>();
        assert_eq!(state.total_items(), items);
        assert_eq!(state.total_amount(), amount);
    }

    #[test]
    fn test_total_amount_saturates_on_huge_prices() {
        let mut state = CartState::new();
        let price = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let huge = product("vault", price, 2);
        state.add_item(&huge);
        assert_eq!(state.total_amount(), huge.price);

        state.add_item(&huge);
        assert_eq!(state.line(&huge.id).unwrap().line_total(), Decimal::MAX);
        assert_eq!(state.total_amount(), Decimal::MAX);

        state.add_item(&product("a", dec!(1), 1));
        assert_eq!(state.total_amount(), Decimal::MAX);
        assert_eq!(state.total_items(), 3);
    }

    #[test]
    fn test_add_out_of_stock_is_noop() {
        let mut state = CartState::new();
        assert!(!state.add_item(&product("a", dec!(1), 0)));
        assert!(state.is_empty());
        assert_eq!(state.total_items(), 0);
        assert_eq!(state.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_add_grows_up_to_stock() {
        let p = product("a", dec!(2.5), 3);
        let mut state = CartState::new();

        for expected in 1..=3 {
            assert!(state.add_item(&p));
            assert_eq!(state.line(&p.id).unwrap().quantity, expected);
            assert_totals_consistent(&state);
        }
        for _ in 0..5 {
            assert!(!state.add_item(&p));
        }
        assert_eq!(state.line(&p.id).unwrap().quantity, 3);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_add_existing_line_checks_incoming_stock() {
        let mut state = CartState::new();
        state.add_item(&product("a", dec!(1), 5));
        state.add_item(&product("a", dec!(1), 5));

        // Catalog now reports only 2 left; the line is already at 2.
        assert!(!state.add_item(&product("a", dec!(1), 2)));
        assert_eq!(state.line(&ProductId::new("a")).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_first_product_snapshot() {
        let mut state = CartState::new();
        state.add_item(&product("a", dec!(3), 5));
        state.add_item(&product("a", dec!(4), 5));

        let line = state.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.unit_price(), dec!(3));
        assert_eq!(state.total_amount(), dec!(6));
    }

    #[test]
    fn test_update_quantity_clamps() {
        let p = product("a", dec!(10), 4);
        let cases: [(i64, u32); 7] = [
            (i64::MIN, 1),
            (-3, 1),
            (0, 1),
            (1, 1),
            (3, 3),
            (4, 4),
            (i64::MAX, 4),
        ];

        for (requested, expected) in cases {
            let mut state = CartState::new();
            state.add_item(&p);
            state.add_item(&p);
            state.update_quantity(&p.id, requested);
            assert_eq!(
                state.line(&p.id).unwrap().quantity,
                expected,
                "requested {requested}"
            );
            assert_totals_consistent(&state);
        }
    }

    #[test]
    fn test_update_quantity_uses_recorded_stock_of_each_line() {
        let mut state = CartState::new();
        state.add_item(&product("a", dec!(1), 2));
        state.add_item(&product("b", dec!(1), 10));

        state.update_quantity(&ProductId::new("a"), 7);
        state.update_quantity(&ProductId::new("b"), 7);

        assert_eq!(state.line(&ProductId::new("a")).unwrap().quantity, 2);
        assert_eq!(state.line(&ProductId::new("b")).unwrap().quantity, 7);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut state = CartState::new();
        state.add_item(&product("a", dec!(1), 2));
        let before = state.clone();

        assert!(!state.update_quantity(&ProductId::new("zzz"), 2));
        assert_eq!(state, before);
    }

    #[test]
    fn test_update_quantity_with_zero_recorded_stock() {
        let mut line = CartLine::new(product("stale", dec!(1), 0));
        line.quantity = 2;
        let mut state = CartState::from_lines([line]);

        state.update_quantity(&ProductId::new("stale"), 5);
        assert_eq!(state.line(&ProductId::new("stale")).unwrap().quantity, 0);
    }

    #[test]
    fn test_remove_item() {
        let mut state = CartState::new();
        state.add_item(&product("a", dec!(1.5), 2));
        state.add_item(&product("b", dec!(2), 2));

        assert!(state.remove_item(&ProductId::new("a")));
        assert_eq!(state.len(), 1);
        assert_eq!(state.total_amount(), dec!(2));

        let before = state.clone();
        assert!(!state.remove_item(&ProductId::new("a")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear() {
        let mut state = CartState::new();
        assert!(!state.clear());

        state.add_item(&product("a", dec!(1), 2));
        state.add_item(&product("b", dec!(1), 2));
        assert!(state.clear());
        assert!(state.is_empty());
        assert_eq!(state.total_items(), 0);
        assert_eq!(state.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut state = CartState::new();
        for id in ["c", "a", "b"] {
            state.add_item(&product(id, dec!(1), 1));
        }
        let ids: Vec<&str> = state.lines().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_from_lines_drops_duplicate_ids() {
        let first = CartLine::new(product("a", dec!(1), 5));
        let mut second = CartLine::new(product("a", dec!(9), 5));
        second.quantity = 4;

        let state = CartState::from_lines([first.clone(), second]);
        assert_eq!(state.lines(), [first]);
    }
}
