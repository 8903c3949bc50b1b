//! Liveness tracking for the trading loop.
//!
//! The loop never exits on a failed step, so a dead broker connection only
//! shows up as a stream of error lines. The monitor turns that stream into a
//! status that tells "running" apart from "running but every step fails".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Overall loop health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// No step has completed yet
    Starting,
    /// The last step succeeded
    Healthy,
    /// Recent steps failed, fewer than the threshold in a row
    Degraded,
    /// At least `failure_threshold` consecutive steps failed
    Failing,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Starting => write!(f, "starting"),
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Failing => write!(f, "failing"),
        }
    }
}

/// Point-in-time health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_steps: u64,
    pub failed_steps: u64,
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct HealthInner {
    status: HealthStatus,
    total_steps: u64,
    failed_steps: u64,
    consecutive_failures: u32,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
    started_at: DateTime<Utc>,
}

/// Shared, cloneable step-outcome recorder.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    inner: Arc<RwLock<HealthInner>>,
    failure_threshold: u32,
}

impl HealthMonitor {
    /// Create a monitor that reports `Failing` after `failure_threshold` failures in a row.
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HealthInner {
                status: HealthStatus::Starting,
                total_steps: 0,
                failed_steps: 0,
                consecutive_failures: 0,
                last_success: None,
                last_error: None,
                started_at: Utc::now(),
            })),
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Record a completed step.
    pub fn record_success(&self) -> HealthStatus {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let previous = inner.status;

        inner.total_steps += 1;
        inner.consecutive_failures = 0;
        inner.last_success = Some(Utc::now());
        inner.status = HealthStatus::Healthy;

        if matches!(previous, HealthStatus::Degraded | HealthStatus::Failing) {
            info!(previous = %previous, "Trading loop recovered");
        }
        inner.status
    }

    /// Record a failed step.
    pub fn record_failure(&self, reason: &str) -> HealthStatus {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let previous = inner.status;

        inner.total_steps += 1;
        inner.failed_steps += 1;
        inner.consecutive_failures += 1;
        inner.last_error = Some(reason.to_string());
        inner.status = if inner.consecutive_failures >= self.failure_threshold {
            HealthStatus::Failing
        } else {
            HealthStatus::Degraded
        };

        if inner.status != previous {
            if inner.status == HealthStatus::Failing {
                error!(
                    consecutive_failures = inner.consecutive_failures,
                    last_error = %reason,
                    "Trading loop is failing every step"
                );
            } else {
                warn!(last_error = %reason, "Trading loop degraded");
            }
        }
        inner.status
    }

    pub fn status(&self) -> HealthStatus {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).status
    }

    /// Check if the loop is making progress.
    pub fn is_healthy(&self) -> bool {
        matches!(self.status(), HealthStatus::Starting | HealthStatus::Healthy | HealthStatus::Degraded)
    }

    pub fn report(&self) -> HealthReport {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        HealthReport {
            status: inner.status,
            total_steps: inner.total_steps,
            failed_steps: inner.failed_steps,
            consecutive_failures: inner.consecutive_failures,
            last_success: inner.last_success,
            last_error: inner.last_error.clone(),
            started_at: inner.started_at,
        }
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_starting() {
        let monitor = HealthMonitor::default();
        assert_eq!(monitor.status(), HealthStatus::Starting);
        assert!(monitor.is_healthy());
    }

    #[test]
    fn test_consecutive_failures_reach_failing() {
        let monitor = HealthMonitor::new(3);

        assert_eq!(monitor.record_failure("timeout"), HealthStatus::Degraded);
        assert_eq!(monitor.record_failure("timeout"), HealthStatus::Degraded);
        assert_eq!(monitor.record_failure("timeout"), HealthStatus::Failing);
        assert!(!monitor.is_healthy());

        let report = monitor.report();
        assert_eq!(report.failed_steps, 3);
        assert_eq!(report.last_error.as_deref(), Some("timeout"));
        assert!(report.last_success.is_none());
    }

    #[test]
    fn test_success_recovers() {
        let monitor = HealthMonitor::new(2);
        monitor.record_failure("a");
        monitor.record_failure("b");
        assert_eq!(monitor.status(), HealthStatus::Failing);

        assert_eq!(monitor.record_success(), HealthStatus::Healthy);
        let report = monitor.report();
        assert_eq!(report.consecutive_failures, 0);
        assert_eq!(report.total_steps, 3);
        assert!(report.last_success.is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let monitor = HealthMonitor::new(1);
        let view = monitor.clone();
        monitor.record_failure("down");
        assert_eq!(view.status(), HealthStatus::Failing);
    }
}
