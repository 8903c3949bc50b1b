//! Order types and structures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire name used by the brokerage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type.
///
/// Only market orders are ever built; execution semantics are left to the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order - execute immediately at best available price
    #[default]
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
        }
    }
}

/// Time in force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeInForce {
    /// Good til canceled
    #[default]
    #[serde(rename = "gtc")]
    GTC,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::GTC => "gtc",
        }
    }
}

/// Order request for submitting new orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Type of order
    pub order_type: OrderType,
    /// Quantity to trade (whole shares)
    pub quantity: Decimal,
    /// Time in force
    pub time_in_force: TimeInForce,
    /// Client-provided order ID; the brokerage refuses a second order with the same one
    pub client_order_id: String,
}

impl OrderRequest {
    /// Create a good-till-canceled market order request with a fresh client order ID.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            time_in_force: TimeInForce::GTC,
            client_order_id: Uuid::new_v4().to_string(),
        }
    }

    /// Set a client order ID.
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = id.into();
        self
    }
}

/// Brokerage acknowledgement of a submitted order.
///
/// Orders are fire-and-forget: the acknowledgement is logged and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Brokerage order ID
    pub id: String,
    /// Echo of the client order ID
    pub client_order_id: String,
    /// Symbol traded
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Requested quantity
    pub quantity: Decimal,
    /// Status reported at submission (`new`, `accepted`, ...)
    pub status: String,
    /// When the brokerage accepted the request
    pub submitted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_request_market() {
        let request = OrderRequest::market("AAPL", Side::Buy, dec!(1));
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.time_in_force, TimeInForce::GTC);
        assert_eq!(request.quantity, dec!(1));
        assert!(Uuid::parse_str(&request.client_order_id).is_ok());
    }

    #[test]
    fn test_client_order_ids_are_unique() {
        let a = OrderRequest::market("AAPL", Side::Sell, dec!(1));
        let b = OrderRequest::market("AAPL", Side::Sell, dec!(1));
        assert_ne!(a.client_order_id, b.client_order_id);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Side::Sell.to_string(), "sell");
        assert_eq!(OrderType::Market.as_str(), "market");
        assert_eq!(
            serde_json::to_string(&TimeInForce::GTC).unwrap(),
            "\"gtc\""
        );
    }
}
