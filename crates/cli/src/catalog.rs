//! Local JSON catalog standing in for the hosted platform.
//!
//! `catalog.json` holds an array of product records. Orders placed at
//! checkout are appended to `orders.json` next to it, and stock levels are
//! written back into the catalog file.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shopfront_cart::{OrderDraft, OrderSink};
use shopfront_core::{OrderId, Product, ProductId};
use thiserror::Error;

const ORDERS_FILE: &str = "orders.json";

/// Catalog file errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// An order as stored in `orders.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOrder {
    pub id: OrderId,
    #[serde(flatten)]
    pub order: OrderDraft,
}

/// Product catalog loaded from a JSON file.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    products: Vec<Product>,
}

impl JsonCatalog {
    /// Load the catalog at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let products = read_json(&path)?;
        Ok(Self { path, products })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownProduct` if no product has this id.
    pub fn product(&self, id: &ProductId) -> Result<&Product, CatalogError> {
        self.products
            .iter()
            .find(|product| &product.id == id)
            .ok_or_else(|| CatalogError::UnknownProduct(id.clone()))
    }

    /// Orders recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the orders file exists but cannot be read.
    pub fn orders(&self) -> Result<Vec<StoredOrder>, CatalogError> {
        let path = self.orders_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    fn orders_path(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(ORDERS_FILE)
    }
}

impl OrderSink for JsonCatalog {
    type Error = CatalogError;

    fn create_order(&mut self, draft: &OrderDraft) -> Result<OrderId, Self::Error> {
        let mut orders = self.orders()?;
        let id = OrderId::generate();
        orders.push(StoredOrder {
            id,
            order: draft.clone(),
        });
        write_json(&self.orders_path(), &orders)?;
        tracing::info!(order_id = %id, items = draft.items.len(), "Order written");
        Ok(id)
    }

    fn set_stock(&mut self, product_id: &ProductId, stock: u32) -> Result<(), Self::Error> {
        let product = self
            .products
            .iter_mut()
            .find(|product| &product.id == product_id)
            .ok_or_else(|| CatalogError::UnknownProduct(product_id.clone()))?;
        product.stock = stock;
        write_json(&self.path, &self.products)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let raw = serde_json::to_string_pretty(value).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, raw).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}
