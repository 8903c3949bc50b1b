//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::{load_config, AppConfig};

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            print_summary(&config);
            println!();
            println!("Effective configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_summary(config: &AppConfig) {
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Symbol: {}", config.trading.symbol);
    println!("Interval: {}s", config.trading.interval_secs);
    println!("Order quantity: {}", config.trading.order_quantity);
    println!(
        "Rate limit: {} calls / {}s",
        config.rate_limit.max_calls, config.rate_limit.period_secs
    );
    println!("Decision source: {}", config.decision.source);

    let credentials = match config.broker_config() {
        Ok(broker) if broker.is_paper() => "found (paper)".to_string(),
        Ok(_) => "found (live)".to_string(),
        Err(e) => format!("missing ({})", e),
    };
    println!("Alpaca credentials: {}", credentials);

    let llm = match config.llm_config() {
        Ok(_) => "found".to_string(),
        Err(e) => format!("missing ({})", e),
    };
    println!("LLM API key: {}", llm);
}
