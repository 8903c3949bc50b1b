//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{Account, OrderAck, OrderRequest, PortfolioSnapshot, Position, Quote};
use async_trait::async_trait;

/// Trait for broker integrations.
///
/// Implementations own their connection and credentials and gate every
/// outbound call through their rate limiter. Business errors are returned,
/// never retried.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Get the most recent trade for a symbol.
    async fn get_latest_trade(&self, symbol: &str) -> Result<Quote, BrokerError>;

    /// Submit a new order.
    ///
    /// # Arguments
    /// * `request` - The order request to submit
    ///
    /// # Returns
    /// The brokerage acknowledgement
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError>;

    /// Get account balances.
    async fn get_account(&self) -> Result<Account, BrokerError>;

    /// Get all positions.
    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// Get cash and positions in one snapshot.
    async fn portfolio_snapshot(&self) -> Result<PortfolioSnapshot, BrokerError> {
        let account = self.get_account().await?;
        let positions = self.get_positions().await?;
        Ok(PortfolioSnapshot::new(account.cash, positions))
    }

    /// Get the broker name.
    fn name(&self) -> &str;
}
