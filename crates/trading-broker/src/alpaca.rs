//! Alpaca broker integration for paper and live trading.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::error::{BrokerError, ConfigError};
use trading_core::traits::Broker;
use trading_core::types::{Account, OrderAck, OrderRequest, Position, Quote, Side};
use tracing::{debug, info};

use crate::RateLimiter;

pub const DEFAULT_KEY_ENV: &str = "APCA_API_KEY_ID";
pub const DEFAULT_SECRET_ENV: &str = "APCA_API_SECRET_KEY";
pub const DEFAULT_BASE_URL_ENV: &str = "APCA_API_BASE_URL";
pub const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";
pub const DEFAULT_DATA_FEED: &str = "iex";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Alpaca API configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub data_url: String,
    pub data_feed: String,
    pub timeout: Duration,
}

impl AlpacaConfig {
    /// Create config directly with key, secret and trading base URL.
    ///
    /// All three must be non-empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = non_empty(api_key.into(), DEFAULT_KEY_ENV)?;
        let api_secret = non_empty(api_secret.into(), DEFAULT_SECRET_ENV)?;
        let base_url = non_empty(base_url.into(), DEFAULT_BASE_URL_ENV)?;

        Ok(Self {
            api_key,
            api_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            data_feed: DEFAULT_DATA_FEED.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Load credentials from the named environment variables.
    pub fn from_env_vars(key_var: &str, secret_var: &str, base_url_var: &str) -> Result<Self, ConfigError> {
        let api_key = env_var(key_var)?;
        let api_secret = env_var(secret_var)?;
        let base_url = env_var(base_url_var)?;
        Self::new(api_key, api_secret, base_url)
    }

    /// Load from the standard `APCA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(DEFAULT_KEY_ENV, DEFAULT_SECRET_ENV, DEFAULT_BASE_URL_ENV)
    }

    /// Override the market data URL.
    pub fn with_data_url(mut self, data_url: impl Into<String>) -> Self {
        self.data_url = data_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the market data feed (`iex`, `sip`).
    pub fn with_data_feed(mut self, feed: impl Into<String>) -> Self {
        self.data_feed = feed.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_paper(&self) -> bool {
        self.base_url.contains("paper-api")
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
}

fn non_empty(value: String, name: &str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingCredential(name.to_string()));
    }
    Ok(value)
}

/// Alpaca API response types
#[derive(Debug, Deserialize)]
struct AlpacaLatestTradeResponse {
    symbol: String,
    trade: AlpacaTrade,
}

#[derive(Debug, Deserialize)]
struct AlpacaTrade {
    t: DateTime<Utc>,
    p: Decimal,
    s: u64,
}

#[derive(Debug, Deserialize)]
struct AlpacaAccount {
    cash: Decimal,
    buying_power: Decimal,
    equity: Decimal,
}

#[derive(Debug, Deserialize)]
struct AlpacaPosition {
    symbol: String,
    qty: Decimal,
    current_price: Decimal,
    #[serde(default)]
    market_value: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    client_order_id: String,
    status: String,
    symbol: String,
    #[serde(default)]
    qty: Option<Decimal>,
    side: Side,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: &'static str,
    client_order_id: &'a str,
}

/// Alpaca broker client.
///
/// Every request waits on the shared [`RateLimiter`] before it goes out and
/// is bounded by the configured timeout.
pub struct AlpacaBroker {
    config: AlpacaConfig,
    client: Client,
    limiter: RateLimiter,
}

impl AlpacaBroker {
    /// Create a new Alpaca broker client.
    pub fn new(config: AlpacaConfig, limiter: RateLimiter) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&config.api_secret)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        Ok(Self { config, client, limiter })
    }

    pub fn config(&self) -> &AlpacaConfig {
        &self.config
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, BrokerError> {
        self.limiter.admit().await;

        let resp = request.send().await.map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(operation, status, text));
        }

        resp.json().await.map_err(|e| {
            if e.is_timeout() {
                BrokerError::Timeout(e.to_string())
            } else {
                BrokerError::Decode(format!("{operation}: {e}"))
            }
        })
    }
}

fn transport_error(e: reqwest::Error) -> BrokerError {
    if e.is_timeout() {
        BrokerError::Timeout(e.to_string())
    } else {
        BrokerError::Connection(e.to_string())
    }
}

fn status_error(operation: &str, status: StatusCode, body: String) -> BrokerError {
    let detail = format!("{operation}: {status}: {body}");
    match status.as_u16() {
        401 => BrokerError::Authentication(detail),
        // Alpaca answers 403 on orders the account cannot afford or is not allowed to place.
        403 if operation == "submit_order" => BrokerError::OrderRejected(detail),
        403 => BrokerError::Authentication(detail),
        404 => BrokerError::NotFound(detail),
        422 if operation == "submit_order" => BrokerError::OrderRejected(detail),
        429 => BrokerError::RateLimited(detail),
        _ => BrokerError::ApiError(detail),
    }
}

#[async_trait]
impl Broker for AlpacaBroker {
    async fn get_latest_trade(&self, symbol: &str) -> Result<Quote, BrokerError> {
        let url = format!("{}/v2/stocks/{}/trades/latest", self.config.data_url, symbol);
        let request = self.client.get(&url).query(&[("feed", self.config.data_feed.as_str())]);

        let data: AlpacaLatestTradeResponse = self.execute("get_latest_trade", request).await?;
        debug!(symbol = %data.symbol, price = %data.trade.p, "Latest trade");

        Ok(Quote::new(data.symbol, data.trade.p, data.trade.t, data.trade.s))
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/v2/orders", self.config.base_url);

        let create_req = CreateOrderRequest {
            symbol: &request.symbol,
            qty: request.quantity.normalize().to_string(),
            side: request.side.as_str(),
            order_type: request.order_type.as_str(),
            time_in_force: request.time_in_force.as_str(),
            client_order_id: &request.client_order_id,
        };

        debug!("Submitting order: {:?}", create_req);

        let order: AlpacaOrder = self
            .execute("submit_order", self.client.post(&url).json(&create_req))
            .await?;

        info!(
            order_id = %order.id,
            status = %order.status,
            "Order submitted: {} {} {}",
            order.side,
            order.qty.unwrap_or(request.quantity),
            order.symbol
        );

        Ok(OrderAck {
            id: order.id,
            client_order_id: order.client_order_id,
            symbol: order.symbol,
            side: order.side,
            quantity: order.qty.unwrap_or(request.quantity),
            status: order.status,
            submitted_at: order.submitted_at,
        })
    }

    async fn get_account(&self) -> Result<Account, BrokerError> {
        let url = format!("{}/v2/account", self.config.base_url);
        let account: AlpacaAccount = self.execute("get_account", self.client.get(&url)).await?;

        Ok(Account {
            cash: account.cash,
            buying_power: account.buying_power,
            equity: account.equity,
        })
    }

    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let url = format!("{}/v2/positions", self.config.base_url);
        let positions: Vec<AlpacaPosition> =
            self.execute("get_positions", self.client.get(&url)).await?;

        Ok(positions
            .into_iter()
            .map(|p| Position {
                market_value: p.market_value.unwrap_or(p.qty * p.current_price),
                symbol: p.symbol,
                quantity: p.qty,
                current_price: p.current_price,
            })
            .collect())
    }

    fn name(&self) -> &str {
        if self.config.is_paper() { "Alpaca Paper" } else { "Alpaca Live" }
    }
}
