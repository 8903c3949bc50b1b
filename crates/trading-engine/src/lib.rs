//! Trading engine: one fetch-decide-submit step and the loop that repeats it.

mod driver;
mod engine;
mod shutdown;
mod sizing;

#[cfg(test)]
mod testing;

pub use driver::{
    validate_interval_secs, Driver, IntervalDriver, IntervalHandle, RunSummary, StepResult,
    DEFAULT_INTERVAL_SECS, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};
pub use engine::{OrderOutcome, StepOutcome, TradingEngine};
pub use shutdown::{channel as shutdown_channel, listen_for_shutdown, Shutdown, ShutdownTrigger};
pub use sizing::{FixedQuantity, SizingPolicy};
