//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trading")]
#[command(author, version, about = "Rate-limited autonomous single-symbol trading loop")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trade until interrupted
    Run(RunArgs),
    /// Run a single step and print the outcome
    Step(StepArgs),
    /// Print cash and open positions
    Portfolio,
    /// List available decision sources
    Sources,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Symbol to trade
    #[arg(short, long, env = "TRADE_SYMBOL")]
    pub symbol: Option<String>,

    /// Seconds between steps (5-300)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Print the portfolio after every successful step
    #[arg(long)]
    pub show_portfolio: bool,
}

#[derive(clap::Args)]
pub struct StepArgs {
    /// Symbol to trade
    #[arg(short, long, env = "TRADE_SYMBOL")]
    pub symbol: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
