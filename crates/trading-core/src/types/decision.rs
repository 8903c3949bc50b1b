//! Per-step trading decision.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Side;

/// What to do at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    /// All decisions, in a fixed order.
    pub const ALL: [Decision; 3] = [Decision::Buy, Decision::Sell, Decision::Hold];

    /// The order side this decision calls for, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Decision::Buy => Some(Side::Buy),
            Decision::Sell => Some(Side::Sell),
            Decision::Hold => None,
        }
    }

    /// Check if this decision triggers an order.
    pub fn is_actionable(&self) -> bool {
        self.side().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "buy",
            Decision::Sell => "sell",
            Decision::Hold => "hold",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text is not exactly one of `buy`, `sell` or `hold`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecisionError(pub String);

impl std::fmt::Display for ParseDecisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a decision: '{}'", self.0)
    }
}

impl std::error::Error for ParseDecisionError {}

impl FromStr for Decision {
    type Err = ParseDecisionError;

    /// Surrounding whitespace and case are ignored; anything else must match exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Decision::Buy),
            "sell" => Ok(Decision::Sell),
            "hold" => Ok(Decision::Hold),
            _ => Err(ParseDecisionError(s.to_string())),
        }
    }
}
