//! Pseudo-random decision source.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::sync::{Mutex, PoisonError};
use trading_core::{traits::DecisionSource, types::Decision};

/// Picks buy, sell or hold uniformly, ignoring the price and all history.
///
/// Used when no language model is configured.
pub struct RandomDecisionSource {
    rng: Mutex<StdRng>,
}

impl RandomDecisionSource {
    /// Create a source seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a reproducible source.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self) -> Decision {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Decision::ALL
            .choose(&mut *rng)
            .copied()
            .unwrap_or(Decision::Hold)
    }
}

impl Default for RandomDecisionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionSource for RandomDecisionSource {
    async fn decide(&self, _last_price: Decimal) -> Decision {
        self.pick()
    }

    fn name(&self) -> &str {
        "random"
    }
}
