//! Unified error type for the cart library.
//!
//! Cart operations themselves never fail. These errors come from the pieces
//! around them: configuration, storage backends, snapshot decoding and
//! checkout submission. Binaries should return `Result<T, Error>`.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::snapshot::SnapshotError;
use crate::storage::StorageError;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Checkout was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(ConfigError::InvalidEnvVar(
            "SHOPFRONT_CURRENCY".to_string(),
            "unsupported currency code: BTC".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Config error: Invalid environment variable SHOPFRONT_CURRENCY: unsupported currency code: BTC"
        );

        let err = Error::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }

    #[test]
    fn test_storage_error_converts() {
        let err: Error = StorageError::InvalidKey("../x".to_string()).into();
        assert!(matches!(err, Error::Storage(StorageError::InvalidKey(_))));
    }
}
