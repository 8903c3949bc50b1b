//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use trading_broker::{
    AlpacaConfig, RateLimiter, DEFAULT_BASE_URL_ENV, DEFAULT_DATA_FEED, DEFAULT_DATA_URL,
    DEFAULT_KEY_ENV, DEFAULT_SECRET_ENV,
};
use trading_core::{error::ConfigError, types::normalize_symbol};
use trading_engine::{validate_interval_secs, FixedQuantity, IntervalHandle, DEFAULT_INTERVAL_SECS};
use trading_monitor::DEFAULT_FAILURE_THRESHOLD;
use trading_strategies::{DecisionSourceRegistry, LlmConfig};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub decision: DecisionSettings,
    #[serde(default)]
    pub health: HealthSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "trading".to_string(),
            environment: "paper".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Log file; empty disables file logging
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Log file path, `None` when unset or empty.
    pub fn file_path(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(Path::new)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: Some("trades.log".to_string()),
        }
    }
}

/// Alpaca API configuration.
///
/// Credentials never live in the file, only the names of the variables
/// holding them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    pub api_key_env: String,
    pub api_secret_env: String,
    pub base_url_env: String,
    pub data_url: String,
    pub data_feed: String,
    pub timeout_secs: u64,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_KEY_ENV.to_string(),
            api_secret_env: DEFAULT_SECRET_ENV.to_string(),
            base_url_env: DEFAULT_BASE_URL_ENV.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            data_feed: DEFAULT_DATA_FEED.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Outbound call quota shared by every broker request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_calls: u32,
    pub period_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_calls: 180,
            period_secs: 60,
        }
    }
}

/// What to trade and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingSettings {
    pub symbol: String,
    pub interval_secs: u64,
    pub order_quantity: u32,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            order_quantity: 1,
        }
    }
}

/// Decision source selection and LLM backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionSettings {
    /// `auto`, `llm` or `random`
    pub source: String,
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            source: "auto".to_string(),
            api_key_env: trading_strategies::DEFAULT_API_KEY_ENV.to_string(),
            base_url: trading_strategies::DEFAULT_BASE_URL.to_string(),
            model: trading_strategies::DEFAULT_MODEL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub failure_threshold: u32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Check every value that does not depend on the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.symbol()?;
        validate_interval_secs(self.trading.interval_secs)?;
        self.sizing()?;
        self.rate_limiter()?;

        if !DecisionSourceRegistry::new().exists(&self.decision.source) {
            return Err(ConfigError::UnknownDecisionSource(self.decision.source.clone()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        if self.alpaca.timeout_secs == 0 {
            return Err(ConfigError::Invalid("alpaca.timeout_secs must be positive".into()));
        }
        if self.decision.timeout_secs == 0 {
            return Err(ConfigError::Invalid("decision.timeout_secs must be positive".into()));
        }
        if self.health.failure_threshold == 0 {
            return Err(ConfigError::Invalid("health.failure_threshold must be positive".into()));
        }
        Ok(())
    }

    pub fn symbol(&self) -> Result<String, ConfigError> {
        normalize_symbol(&self.trading.symbol)
    }

    pub fn interval(&self) -> Result<IntervalHandle, ConfigError> {
        IntervalHandle::new(Duration::from_secs(self.trading.interval_secs))
    }

    pub fn sizing(&self) -> Result<FixedQuantity, ConfigError> {
        FixedQuantity::new(Decimal::from(self.trading.order_quantity))
    }

    pub fn rate_limiter(&self) -> Result<RateLimiter, ConfigError> {
        RateLimiter::new(
            self.rate_limit.max_calls,
            Duration::from_secs(self.rate_limit.period_secs),
        )
    }

    /// Broker credentials from the configured environment variables.
    pub fn broker_config(&self) -> Result<AlpacaConfig, ConfigError> {
        let alpaca = &self.alpaca;
        Ok(
            AlpacaConfig::from_env_vars(&alpaca.api_key_env, &alpaca.api_secret_env, &alpaca.base_url_env)?
                .with_data_url(&alpaca.data_url)
                .with_data_feed(&alpaca.data_feed)
                .with_timeout(Duration::from_secs(alpaca.timeout_secs)),
        )
    }

    /// LLM backend settings; fails when the API key variable is unset.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let decision = &self.decision;
        Ok(LlmConfig::from_env(&decision.api_key_env)?
            .with_base_url(&decision.base_url)
            .with_model(&decision.model)
            .with_timeout(Duration::from_secs(decision.timeout_secs)))
    }
}
