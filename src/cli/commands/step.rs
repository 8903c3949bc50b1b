//! Single step command.

use anyhow::{Context, Result};
use trading_config::AppConfig;

use crate::cli::StepArgs;

pub async fn run(args: StepArgs, config: &AppConfig) -> Result<()> {
    let engine = super::build_engine(config, args.symbol.as_deref())?;

    let outcome = engine
        .step()
        .await
        .with_context(|| format!("fetching latest trade for {}", engine.symbol()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        super::print_outcome(&outcome);
    }

    Ok(())
}
