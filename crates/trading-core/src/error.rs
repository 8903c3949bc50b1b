//! Error types for the trading system.

use thiserror::Error;

/// Startup configuration errors.
///
/// These are fatal: they are raised while wiring the system together and the
/// trading loop never starts when one occurs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{0}' not set or empty")]
    MissingCredential(String),

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("polling interval {secs}s outside {min}..={max}s")]
    InvalidInterval { secs: u64, min: u64, max: u64 },

    #[error("rate limit needs max_calls > 0 and period > 0 (got {max_calls} calls per {period_secs}s)")]
    InvalidRateLimit { max_calls: u32, period_secs: u64 },

    #[error("order quantity must be a whole number >= 1 (got {0})")]
    InvalidQuantity(String),

    #[error("unknown decision source '{0}'")]
    UnknownDecisionSource(String),

    #[error("configuration source error: {0}")]
    Source(String),

    #[error("{0}")]
    Invalid(String),
}

/// Broker-specific errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by broker: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl BrokerError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::Configuration(_) => "configuration",
            BrokerError::Connection(_) => "connection",
            BrokerError::Timeout(_) => "timeout",
            BrokerError::Authentication(_) => "authentication",
            BrokerError::OrderRejected(_) => "order_rejected",
            BrokerError::NotFound(_) => "not_found",
            BrokerError::RateLimited(_) => "rate_limited",
            BrokerError::ApiError(_) => "api",
            BrokerError::Decode(_) => "decode",
        }
    }
}

/// Decision backend errors.
///
/// Never surfaced past a decision source; every variant degrades to a hold.
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("backend did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("unrecognised response '{0}'")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_error_kind() {
        assert_eq!(BrokerError::Timeout("x".into()).kind(), "timeout");
        assert_eq!(BrokerError::OrderRejected("x".into()).kind(), "order_rejected");
    }

    #[test]
    fn test_config_error_message_names_variable() {
        let err = ConfigError::MissingCredential("APCA_API_KEY_ID".into());
        assert_eq!(
            err.to_string(),
            "environment variable 'APCA_API_KEY_ID' not set or empty"
        );
    }
}
