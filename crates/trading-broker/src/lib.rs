//! Broker integrations.

mod alpaca;
mod rate_limit;

pub use alpaca::{
    AlpacaBroker, AlpacaConfig, DEFAULT_BASE_URL_ENV, DEFAULT_DATA_FEED, DEFAULT_DATA_URL,
    DEFAULT_KEY_ENV, DEFAULT_SECRET_ENV, DEFAULT_TIMEOUT,
};
pub use rate_limit::RateLimiter;
