//! Trading loop CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use trading_config::load_config;
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Validation reports its own load errors, before logging exists.
    if let Commands::ValidateConfig = cli.command {
        return cli::commands::validate::run(&cli.config).await;
    }

    let config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(|l| l.as_str())
        .unwrap_or(config.logging.level.as_str());
    let json = cli.json_logs || config.logging.format == "json";
    let _guard = setup_logging(level, json, config.logging.file_path());

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &config).await,
        Commands::Step(args) => cli::commands::step::run(args, &config).await,
        Commands::Portfolio => cli::commands::portfolio::run(&config).await,
        Commands::Sources => cli::commands::sources::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
