//! Core data types for the trading system.

mod decision;
mod order;
mod position;
mod quote;

pub use decision::{Decision, ParseDecisionError};
pub use order::{OrderAck, OrderRequest, OrderType, Side, TimeInForce};
pub use position::{Account, PortfolioSnapshot, Position};
pub use quote::{normalize_symbol, Quote, MAX_SYMBOL_LEN};
