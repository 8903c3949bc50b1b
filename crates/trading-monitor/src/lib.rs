//! Logging and liveness monitoring.

mod health;
mod logging;

pub use health::{HealthMonitor, HealthReport, HealthStatus, DEFAULT_FAILURE_THRESHOLD};
pub use logging::setup_logging;
