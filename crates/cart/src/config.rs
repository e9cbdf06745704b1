//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_DATA_DIR` - Directory for client-local storage (default: .shopfront)
//! - `SHOPFRONT_CART_KEY` - Storage key of the cart snapshot (default: cart-storage)
//! - `SHOPFRONT_SHIPPING_FLAT_RATE` - Flat shipping for non-empty orders (default: 5.00)
//! - `SHOPFRONT_CURRENCY` - ISO 4217 display currency (default: USD)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use shopfront_core::CurrencyCode;
use thiserror::Error;

use crate::store::DEFAULT_CART_KEY;

const DEFAULT_DATA_DIR: &str = ".shopfront";
const DEFAULT_SHIPPING_FLAT_RATE: &str = "5.00";
const DEFAULT_CURRENCY: &str = "USD";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory backing the file store
    pub data_dir: PathBuf,
    /// Storage key the cart snapshot is written under
    pub cart_key: String,
    /// Shipping charged at checkout when the subtotal is positive
    pub shipping_flat_rate: Decimal,
    /// Currency used to display amounts
    pub currency: CurrencyCode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
            shipping_flat_rate: Decimal::new(500, 2),
            currency: CurrencyCode::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let data_dir = PathBuf::from(get_or_default("SHOPFRONT_DATA_DIR", DEFAULT_DATA_DIR));

        let cart_key = get_or_default("SHOPFRONT_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let shipping_flat_rate = parse_amount(
            "SHOPFRONT_SHIPPING_FLAT_RATE",
            &get_or_default("SHOPFRONT_SHIPPING_FLAT_RATE", DEFAULT_SHIPPING_FLAT_RATE),
        )?;

        let currency = CurrencyCode::from_str(&get_or_default("SHOPFRONT_CURRENCY", DEFAULT_CURRENCY))
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_CURRENCY".to_string(), e.to_string()))?;

        Ok(Self {
            data_dir,
            cart_key,
            shipping_flat_rate,
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a non-negative decimal amount.
fn parse_amount(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    let amount = Decimal::from_str(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must not be negative (got {amount})"),
        ));
    }
    Ok(amount)
}
