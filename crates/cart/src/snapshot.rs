//! Persisted cart snapshot.
//!
//! The cart is written as one JSON document, `{ "items": [...] }`, replacing
//! whatever was stored before. Reading also accepts the envelope used by the
//! earlier browser storefront:
//!
//! ```json
//! { "state": { "items": [...], "totalItems": 2, "totalAmount": 17 }, "version": 0 }
//! ```
//!
//! Stored totals are ignored; they are always recomputed from the lines.

use serde::Deserialize;
use thiserror::Error;

use crate::line::CartLine;
use crate::state::CartState;

/// Snapshot encoding or decoding failed.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode cart snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Deserialize)]
struct StoredItems {
    items: Vec<CartLine>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCart {
    Plain(StoredItems),
    Envelope { state: StoredItems },
}

impl StoredCart {
    fn into_items(self) -> Vec<CartLine> {
        match self {
            Self::Plain(stored) | Self::Envelope { state: stored } => stored.items,
        }
    }
}

/// Serialize the full cart state.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn encode(state: &CartState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Encode)
}

/// Parse a stored snapshot in either accepted layout.
///
/// Lines repeating an earlier product id are dropped, as are zero-quantity
/// lines for products that still had stock. The store never writes those.
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] if the text matches neither layout.
pub fn decode(raw: &str) -> Result<CartState, SnapshotError> {
    let stored: StoredCart = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
    let lines = stored.into_items().into_iter().filter(|line| {
        let written_by_store = line.quantity > 0 || line.stock() == 0;
        if !written_by_store {
            tracing::warn!(product_id = %line.id(), "Dropping zero-quantity cart line");
        }
        written_by_store
    });
    Ok(CartState::from_lines(lines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use shopfront_core::{Product, ProductId};

    use super::*;

    fn tote(stock: u32) -> Product {
        Product {
            id: ProductId::new("tote"),
            name: "Canvas tote".to_string(),
            description: "Heavy cotton".to_string(),
            price: dec!(8.5),
            image_url: None,
            category: "bags".to_string(),
            stock,
        }
    }

    #[test]
    fn test_encode_layout() {
        let mut state = CartState::new();
        state.add_item(&tote(2));

        let value: serde_json::Value = serde_json::from_str(&encode(&state).unwrap()).unwrap();
        let items = value["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["quantity"], 1);
        assert_eq!(items[0]["name"], "Canvas tote");
    }

    #[test]
    fn test_roundtrip_preserves_state() {
        let mut state = CartState::new();
        state.add_item(&tote(3));
        state.add_item(&tote(3));

        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.total_amount(), dec!(17));
    }

    #[test]
    fn test_decode_browser_envelope() {
        let raw = r#"{
            "state": {
                "items": [{
                    "id": "tote", "name": "Canvas tote", "description": "",
                    "price": 8.5, "image_url": null, "category": "bags",
                    "stock": 2, "quantity": 2
                }],
                "totalItems": 99,
                "totalAmount": 1000
            },
            "version": 0
        }"#;

        let state = decode(raw).unwrap();
        assert_eq!(state.total_items(), 2);
        assert_eq!(state.total_amount(), dec!(17));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("").is_err());
        assert!(decode("{not json").is_err());
        assert!(decode(r#"{"items": [{"id": "x"}]}"#).is_err());
        assert!(decode(r#"{"lines": []}"#).is_err());
    }

    #[test]
    fn test_decode_drops_zero_quantity_lines_with_stock() {
        let raw = r#"{"items": [
            {"id": "a", "name": "A", "price": "1", "stock": 5, "quantity": 0},
            {"id": "b", "name": "B", "price": "2", "stock": 3, "quantity": 50},
            {"id": "c", "name": "C", "price": "4", "stock": 0, "quantity": 0}
        ]}"#;
        let state = decode(raw).unwrap();

        assert!(state.line(&ProductId::new("a")).is_none());
        assert_eq!(state.line(&ProductId::new("b")).unwrap().quantity, 50);
        assert_eq!(state.line(&ProductId::new("c")).unwrap().quantity, 0);
        assert_eq!(state.total_items(), 50);
        assert_eq!(state.total_amount(), dec!(100));
    }

    #[test]
    fn test_decode_drops_repeated_ids() {
        let raw = r#"{"items": [
            {"id": "a", "name": "A", "price": "1", "stock": 5, "quantity": 2},
            {"id": "a", "name": "A", "price": "1", "stock": 5, "quantity": 4}
        ]}"#;
        let state = decode(raw).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.total_items(), 2);
    }
}
