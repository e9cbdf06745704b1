//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod session;

use std::path::PathBuf;

use rust_decimal::Decimal;
use shopfront_cart::{
    CartConfig, CartStore, CheckoutError, ConfigError, FileStore, KeyValueStore, StorageError,
};
use shopfront_core::{Price, UserId};
use thiserror::Error;

use crate::catalog::{CatalogError, JsonCatalog};

/// Storage key the CLI writes the signed-in user under.
pub const AUTH_TOKEN_KEY: &str = "sb-shopfront-auth-token";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

/// Settings and paths shared by every command.
#[derive(Debug)]
pub struct Context {
    pub config: CartConfig,
    pub catalog_path: PathBuf,
}

impl Context {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if a `SHOPFRONT_*` variable is invalid.
    pub fn from_env(catalog_path: PathBuf) -> Result<Self, CommandError> {
        Ok(Self {
            config: CartConfig::from_env()?,
            catalog_path,
        })
    }

    #[must_use]
    pub fn storage(&self) -> FileStore {
        FileStore::new(&self.config.data_dir)
    }

    #[must_use]
    pub fn open_store(&self) -> CartStore<FileStore> {
        CartStore::load(self.storage(), &self.config.cart_key)
    }

    pub fn open_catalog(&self) -> Result<JsonCatalog, CommandError> {
        Ok(JsonCatalog::open(&self.catalog_path)?)
    }

    /// The user recorded by `login`, if any.
    pub fn signed_in_user(&self) -> Result<Option<UserId>, CommandError> {
        let Some(raw) = self.storage().get(AUTH_TOKEN_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse() {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                tracing::warn!("Ignoring unreadable auth token");
                Ok(None)
            }
        }
    }

    #[must_use]
    pub const fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.config.currency)
    }
}
