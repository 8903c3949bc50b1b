//! Core traits for the trading system.

mod broker;
mod decision_source;

pub use broker::Broker;
pub use decision_source::DecisionSource;
