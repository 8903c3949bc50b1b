//! Trading loop command.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use trading_config::AppConfig;
use trading_engine::{
    listen_for_shutdown, shutdown_channel, Driver, IntervalDriver, IntervalHandle,
};
use trading_monitor::HealthMonitor;

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let engine = Arc::new(super::build_engine(config, args.symbol.as_deref())?);
    let interval = match args.interval {
        Some(secs) => IntervalHandle::new(Duration::from_secs(secs))?,
        None => config.interval()?,
    };

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(listen_for_shutdown(trigger));

    let health = HealthMonitor::new(config.health.failure_threshold);
    let driver = IntervalDriver::new(interval, health.clone(), shutdown);

    info!(
        symbol = engine.symbol(),
        decider = engine.decider_name(),
        interval_secs = driver.interval().get().as_secs(),
        "Starting trading loop, press Ctrl-C to stop"
    );

    // Snapshots are fetched off the loop so a slow account call never delays a step.
    let refresh = args.show_portfolio.then(|| {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let engine = engine.clone();
        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                match engine.portfolio_snapshot().await {
                    Ok(snapshot) => println!("{}\n", snapshot),
                    Err(e) => warn!(kind = e.kind(), error = %e, "Portfolio refresh failed"),
                }
            }
        });
        (tx, task)
    });

    let summary = driver
        .run_forever(&engine, |result| match result {
            Ok(outcome) => {
                super::print_outcome(outcome);
                if let Some((tx, _)) = &refresh {
                    request_refresh(tx);
                }
            }
            Err(e) => println!("Step failed ({}): {}", e.kind(), e),
        })
        .await;

    if let Some((tx, task)) = refresh {
        drop(tx);
        let _ = task.await;
    }

    let report = health.report();
    println!();
    println!("Steps: {}  Failed: {}", summary.steps, summary.failures);
    println!("Health: {}", report.status);

    Ok(())
}

/// Ask for a portfolio refresh; a request already waiting absorbs this one.
fn request_refresh(tx: &mpsc::Sender<()>) {
    match tx.try_send(()) {
        Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
        Err(mpsc::error::TrySendError::Closed(())) => {
            warn!("Portfolio refresh task has stopped");
        }
    }
}
