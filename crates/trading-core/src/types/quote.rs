//! Latest-trade quote.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MAX_SYMBOL_LEN: usize = 10;

/// Snapshot of the last trade printed for a symbol.
///
/// Fetched fresh on every step; nothing holds on to a quote between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol
    pub symbol: String,
    /// Trade price
    pub price: Decimal,
    /// When the trade printed
    pub timestamp: DateTime<Utc>,
    /// Trade size in shares
    pub size: u64,
}

impl Quote {
    /// Create a new quote.
    pub fn new(symbol: impl Into<String>, price: Decimal, timestamp: DateTime<Utc>, size: u64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
            size,
        }
    }
}

/// Validate a ticker symbol and return it upper-cased.
///
/// Accepts ASCII letters, digits and `.` (for share classes such as `BRK.B`).
pub fn normalize_symbol(symbol: &str) -> Result<String, ConfigError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.');

    if valid {
        Ok(symbol)
    } else {
        Err(ConfigError::InvalidSymbol(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("BRK.B").unwrap(), "BRK.B");
    }

    #[test]
    fn test_normalize_symbol_rejects() {
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("   ").is_err());
        assert!(normalize_symbol("AA PL").is_err());
        assert!(normalize_symbol("AAPL;DROP").is_err());
        assert!(normalize_symbol("VERYLONGSYMBOL").is_err());
    }
}
