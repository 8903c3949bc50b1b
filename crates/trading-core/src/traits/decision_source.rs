//! Decision source trait definition.

use crate::types::Decision;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Produces a buy/sell/hold decision for the latest price.
///
/// Deciding is infallible: a source that cannot reach a confident answer
/// returns [`Decision::Hold`].
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// Decide what to do at `last_price`.
    async fn decide(&self, last_price: Decimal) -> Decision;

    /// Get the source name.
    fn name(&self) -> &str;
}
