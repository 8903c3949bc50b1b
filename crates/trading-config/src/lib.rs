//! Configuration management.

mod settings;

pub use settings::{
    AlpacaSettings, AppConfig, AppSettings, DecisionSettings, HealthSettings, LoggingConfig,
    RateLimitSettings, TradingSettings,
};

use config::{Config, Environment, File};
use std::path::Path;
use trading_core::error::ConfigError;

/// Load configuration from an optional file and `TRADING__SECTION__KEY` variables.
///
/// A missing file is not an error; defaults fill every absent key. The result
/// is validated before it is returned.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_config_with_env(path, Environment::with_prefix("TRADING"))
}

fn load_config_with_env(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env.separator("__").try_parsing(true))
        .build()
        .map_err(|e| ConfigError::Source(e.to_string()))?;

    let config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Source(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
