//! CLI command implementations.

pub mod portfolio;
pub mod run;
pub mod sources;
pub mod step;
pub mod validate;

use anyhow::{Context, Result};
use std::sync::Arc;
use trading_broker::AlpacaBroker;
use trading_config::AppConfig;
use trading_engine::{OrderOutcome, StepOutcome, TradingEngine};
use trading_strategies::DecisionSourceRegistry;

/// Build the rate-limited Alpaca client from configuration and environment.
pub fn build_broker(config: &AppConfig) -> Result<Arc<AlpacaBroker>> {
    let credentials = config
        .broker_config()
        .context("loading Alpaca credentials")?;
    let limiter = config.rate_limiter()?;
    let broker = AlpacaBroker::new(credentials, limiter).context("creating Alpaca client")?;
    Ok(Arc::new(broker))
}

/// Wire broker, decision source and sizing into an engine.
///
/// `symbol` overrides the configured symbol.
pub fn build_engine(config: &AppConfig, symbol: Option<&str>) -> Result<TradingEngine> {
    let broker = build_broker(config)?;
    let decider = DecisionSourceRegistry::new()
        .create(&config.decision.source, config.llm_config())
        .context("creating decision source")?;

    let symbol = match symbol {
        Some(symbol) => symbol.to_string(),
        None => config.symbol()?,
    };

    let engine = TradingEngine::new(broker, decider, &symbol)
        .context("invalid symbol")?
        .with_sizing(Arc::new(config.sizing()?));
    Ok(engine)
}

pub fn print_outcome(outcome: &StepOutcome) {
    println!(
        "{} {}  Price: {}  Decision: {}",
        outcome.quote_time.format("%Y-%m-%d %H:%M:%S"),
        outcome.symbol,
        outcome.price.round_dp(2),
        outcome.decision
    );

    match &outcome.order {
        OrderOutcome::NotRequired => {}
        OrderOutcome::Skipped { quantity } => {
            println!("  Order skipped: quantity {} is below one share", quantity);
        }
        OrderOutcome::Submitted(ack) => {
            println!(
                "  Order {} {} {} {} ({})",
                ack.id, ack.side, ack.quantity, ack.symbol, ack.status
            );
        }
        OrderOutcome::Failed { side, error } => {
            println!("  {} order failed: {}", side, error);
        }
    }
}
