//! Order sizing policies.

use rust_decimal::Decimal;
use trading_core::{error::ConfigError, types::Decision};

/// Decides how many shares a triggered order is for.
pub trait SizingPolicy: Send + Sync {
    /// Quantity for an order placed on `decision` at `price`.
    ///
    /// Anything below one share means "do not place the order".
    fn quantity(&self, decision: Decision, price: Decimal) -> Decimal;
}

/// Same number of shares on every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuantity(Decimal);

impl FixedQuantity {
    /// Create a fixed size; must be a whole number of at least one share.
    pub fn new(quantity: Decimal) -> Result<Self, ConfigError> {
        if quantity < Decimal::ONE || !quantity.fract().is_zero() {
            return Err(ConfigError::InvalidQuantity(quantity.to_string()));
        }
        Ok(Self(quantity))
    }

    pub fn get(&self) -> Decimal {
        self.0
    }
}

impl Default for FixedQuantity {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl SizingPolicy for FixedQuantity {
    fn quantity(&self, _decision: Decision, _price: Decimal) -> Decimal {
        self.0
    }
}
