//! Portfolio command.

use anyhow::{Context, Result};
use trading_config::AppConfig;
use trading_core::Broker;

pub async fn run(config: &AppConfig) -> Result<()> {
    let broker = super::build_broker(config)?;

    let snapshot = broker
        .portfolio_snapshot()
        .await
        .context("fetching portfolio")?;

    println!("{}", snapshot);
    println!("Market value: {}", snapshot.total_market_value().round_dp(2));

    Ok(())
}
