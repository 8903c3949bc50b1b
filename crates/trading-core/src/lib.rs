//! Core types and traits for the trading system.
//!
//! This crate provides the foundational building blocks including:
//! - Quotes, decisions, order requests and portfolio snapshots
//! - The `Broker` and `DecisionSource` traits
//! - The error taxonomy shared by every crate

pub mod types;
pub mod traits;
pub mod error;

pub use error::{BrokerError, ConfigError, DecisionError};
pub use types::*;
pub use traits::*;
