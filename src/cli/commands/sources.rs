//! List decision sources command.

use anyhow::Result;
use trading_strategies::DecisionSourceRegistry;

pub async fn run() -> Result<()> {
    let registry = DecisionSourceRegistry::new();

    println!("Available Decision Sources");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ", info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!();
    }

    println!("Set decision.source in the configuration to select one.");

    Ok(())
}
