//! Account, position and portfolio snapshot types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Brokerage account balances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Available cash
    pub cash: Decimal,
    /// Buying power (may be different from cash due to margin)
    pub buying_power: Decimal,
    /// Total equity (cash + market value of positions)
    pub equity: Decimal,
}

/// A position in a single security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Number of shares (positive for long, negative for short)
    pub quantity: Decimal,
    /// Current market price
    pub current_price: Decimal,
    /// Market value (quantity * current_price)
    pub market_value: Decimal,
}

impl Position {
    /// Create a new position; market value is derived from quantity and price.
    pub fn new(symbol: impl Into<String>, quantity: Decimal, current_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            current_price,
            market_value: quantity * current_price,
        }
    }
}

/// Cash plus positions, pulled on demand for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Available cash
    pub cash: Decimal,
    /// Positions in the order the brokerage listed them
    pub positions: Vec<Position>,
}

impl PortfolioSnapshot {
    pub fn new(cash: Decimal, positions: Vec<Position>) -> Self {
        Self { cash, positions }
    }

    /// Get a position by symbol.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Get the total market value of all positions.
    pub fn total_market_value(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value).sum()
    }
}

impl fmt::Display for PortfolioSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cash: {}", self.cash)?;
        write!(f, "Positions:")?;
        for p in &self.positions {
            write!(f, "\n{} {} @ {}", p.symbol, p.quantity, p.current_price)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_display() {
        let snapshot = PortfolioSnapshot::new(
            dec!(1000.50),
            vec![
                Position::new("AAPL", dec!(3), dec!(150.25)),
                Position::new("MSFT", dec!(1), dec!(410)),
            ],
        );

        assert_eq!(
            snapshot.to_string(),
            "Cash: 1000.50\nPositions:\nAAPL 3 @ 150.25\nMSFT 1 @ 410"
        );
    }

    #[test]
    fn test_empty_snapshot_display() {
        let snapshot = PortfolioSnapshot::new(dec!(25), vec![]);
        assert_eq!(snapshot.to_string(), "Cash: 25\nPositions:");
    }

    #[test]
    fn test_snapshot_lookup_and_value() {
        let snapshot = PortfolioSnapshot::new(
            dec!(0),
            vec![
                Position::new("AAPL", dec!(2), dec!(100)),
                Position::new("TSLA", dec!(-1), dec!(50)),
            ],
        );

        assert_eq!(snapshot.position("AAPL").map(|p| p.quantity), Some(dec!(2)));
        assert!(snapshot.position("GOOG").is_none());
        assert_eq!(snapshot.total_market_value(), dec!(150));
    }
}
