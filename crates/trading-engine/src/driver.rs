//! Step scheduling.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use trading_core::error::{BrokerError, ConfigError};
use trading_monitor::HealthMonitor;
use tracing::{error, info};

use crate::engine::{StepOutcome, TradingEngine};
use crate::shutdown::Shutdown;

pub const MIN_INTERVAL_SECS: u64 = 5;
pub const MAX_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Result handed to the tick callback after every step.
pub type StepResult = Result<StepOutcome, BrokerError>;

/// Check a polling interval against the allowed range.
pub fn validate_interval_secs(secs: u64) -> Result<u64, ConfigError> {
    if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::InvalidInterval {
            secs,
            min: MIN_INTERVAL_SECS,
            max: MAX_INTERVAL_SECS,
        })
    }
}

/// Shared, runtime-adjustable polling interval.
///
/// The driver re-reads it before every wait, so a change takes effect from
/// the next wait onwards.
#[derive(Debug, Clone)]
pub struct IntervalHandle {
    secs: Arc<AtomicU64>,
}

impl IntervalHandle {
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        let secs = validate_interval_secs(interval.as_secs())?;
        Ok(Self {
            secs: Arc::new(AtomicU64::new(secs)),
        })
    }

    pub fn get(&self) -> Duration {
        Duration::from_secs(self.secs.load(Ordering::Relaxed))
    }

    pub fn set(&self, interval: Duration) -> Result<(), ConfigError> {
        let secs = validate_interval_secs(interval.as_secs())?;
        self.secs.store(secs, Ordering::Relaxed);
        info!(interval_secs = secs, "Polling interval changed");
        Ok(())
    }
}

impl Default for IntervalHandle {
    fn default() -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(DEFAULT_INTERVAL_SECS)),
        }
    }
}

/// Steps counted over one `run_forever` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub failures: u64,
}

/// Runs an engine's steps until shut down.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Step `engine` repeatedly, passing every result to `on_tick`.
    ///
    /// A failed step is logged and the loop carries on. Steps never overlap.
    async fn run_forever<F>(&self, engine: &TradingEngine, on_tick: F) -> RunSummary
    where
        F: FnMut(&StepResult) + Send;
}

/// Re-arms a timer after each step: the next step starts one interval after
/// the previous one started, or immediately if the step overran.
pub struct IntervalDriver {
    interval: IntervalHandle,
    health: HealthMonitor,
    shutdown: Shutdown,
}

impl IntervalDriver {
    pub fn new(interval: IntervalHandle, health: HealthMonitor, shutdown: Shutdown) -> Self {
        Self {
            interval,
            health,
            shutdown,
        }
    }

    pub fn interval(&self) -> &IntervalHandle {
        &self.interval
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }
}

#[async_trait]
impl Driver for IntervalDriver {
    async fn run_forever<F>(&self, engine: &TradingEngine, mut on_tick: F) -> RunSummary
    where
        F: FnMut(&StepResult) + Send,
    {
        let mut shutdown = self.shutdown.clone();
        let mut summary = RunSummary::default();

        info!(
            symbol = engine.symbol(),
            broker = engine.broker_name(),
            decider = engine.decider_name(),
            interval_secs = self.interval.get().as_secs(),
            "Trading loop started"
        );

        while !shutdown.is_triggered() {
            let started = Instant::now();
            let result = engine.step().await;
            summary.steps += 1;

            match &result {
                Ok(_) => {
                    self.health.record_success();
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(
                        symbol = engine.symbol(),
                        operation = "get_latest_trade",
                        kind = e.kind(),
                        error = %e,
                        "Step failed"
                    );
                    self.health.record_failure(&e.to_string());
                }
            }

            on_tick(&result);

            let deadline = started + self.interval.get();
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown.wait() => break,
            }
        }

        info!(
            steps = summary.steps,
            failures = summary.failures,
            health = %self.health.status(),
            "Trading loop stopped"
        );
        summary
    }
}
