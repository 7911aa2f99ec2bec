//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BOOKSHELF_DATA_DIR` - Directory holding durable slots (default: .bookshelf)
//! - `BOOKSHELF_CART_SLOT` - Name of the cart slot (default: bookstoreCart)
//! - `BOOKSHELF_TAX_RATE` - Checkout tax rate as a fraction (default: 0.10)

use std::path::PathBuf;
use std::str::FromStr;

use bookshelf_core::DEFAULT_TAX_RATE;
use rust_decimal::Decimal;
use thiserror::Error;

pub const DATA_DIR_VAR: &str = "BOOKSHELF_DATA_DIR";
pub const CART_SLOT_VAR: &str = "BOOKSHELF_CART_SLOT";
pub const TAX_RATE_VAR: &str = "BOOKSHELF_TAX_RATE";

const DEFAULT_DATA_DIR: &str = ".bookshelf";
const DEFAULT_CART_SLOT: &str = "bookstoreCart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory that holds the durable cart slot
    pub data_dir: PathBuf,
    /// Slot name; the cart is stored at `<data_dir>/<cart_slot>.json`
    pub cart_slot: String,
    /// Tax rate used for the checkout summary
    pub tax_rate: Decimal,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart_slot: DEFAULT_CART_SLOT.to_string(),
            tax_rate: DEFAULT_TAX_RATE,
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
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(get_or_default(&lookup, DATA_DIR_VAR, DEFAULT_DATA_DIR));

        let cart_slot = get_or_default(&lookup, CART_SLOT_VAR, DEFAULT_CART_SLOT);
        validate_slot_name(&cart_slot)
            .map_err(|reason| ConfigError::InvalidEnvVar(CART_SLOT_VAR.to_string(), reason))?;

        let tax_rate = match lookup(TAX_RATE_VAR) {
            Some(raw) => parse_tax_rate(&raw)
                .map_err(|reason| ConfigError::InvalidEnvVar(TAX_RATE_VAR.to_string(), reason))?,
            None => DEFAULT_TAX_RATE,
        };

        Ok(Self {
            data_dir,
            cart_slot,
            tax_rate,
        })
    }

    /// Path of the file backing the cart slot.
    #[must_use]
    pub fn slot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.cart_slot))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Slot names become file names, so keep them to a safe character set.
fn validate_slot_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("slot name cannot be empty".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(format!(
            "slot name may only contain ASCII letters, digits, '-' and '_' (found '{c}')"
        ));
    }
    Ok(())
}

/// Parse a tax rate fraction in `0..=1`.
fn parse_tax_rate(raw: &str) -> Result<Decimal, String> {
    let rate = Decimal::from_str(raw.trim()).map_err(|e| e.to_string())?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(format!("must be between 0 and 1 (got {rate})"));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CartConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.slot_path(), PathBuf::from(".bookshelf/bookstoreCart.json"));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_vars(vars(&[
            (DATA_DIR_VAR, "/var/lib/bookshelf"),
            (CART_SLOT_VAR, "guest-cart_2"),
            (TAX_RATE_VAR, " 0.0825 "),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/bookshelf"));
        assert_eq!(config.cart_slot, "guest-cart_2");
        assert_eq!(config.tax_rate, Decimal::new(825, 4));
    }

    #[test]
    fn test_invalid_slot_name() {
        for bad in ["", "../escape", "cart.json", "two words"] {
            let err = CartConfig::from_vars(vars(&[(CART_SLOT_VAR, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == CART_SLOT_VAR));
        }
    }

    #[test]
    fn test_invalid_tax_rate() {
        for bad in ["abc", "-0.1", "1.5"] {
            let err = CartConfig::from_vars(vars(&[(TAX_RATE_VAR, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == TAX_RATE_VAR));
        }
    }

    #[test]
    fn test_tax_rate_bounds_inclusive() {
        assert_eq!(parse_tax_rate("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_tax_rate("1").unwrap(), Decimal::ONE);
    }
}
