//! Fetch, decide, maybe submit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trading_core::error::{BrokerError, ConfigError};
use trading_core::traits::{Broker, DecisionSource};
use trading_core::types::{normalize_symbol, Decision, OrderAck, OrderRequest, PortfolioSnapshot, Side};
use tracing::{error, info, warn};

use crate::sizing::{FixedQuantity, SizingPolicy};

/// What happened to the order a step may have placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderOutcome {
    /// The decision was hold
    NotRequired,
    /// The sizing policy produced less than one share or a fractional quantity
    Skipped { quantity: Decimal },
    /// The brokerage accepted the order
    Submitted(OrderAck),
    /// The brokerage refused or could not be reached
    Failed { side: Side, error: String },
}

/// Observable result of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub symbol: String,
    pub decision: Decision,
    pub price: Decimal,
    pub quote_time: DateTime<Utc>,
    pub order: OrderOutcome,
}

impl StepOutcome {
    /// Whether this step sent an order to the brokerage.
    pub fn order_attempted(&self) -> bool {
        matches!(self.order, OrderOutcome::Submitted(_) | OrderOutcome::Failed { .. })
    }
}

/// Single-symbol trading engine.
///
/// Holds no state between steps beyond its collaborators, so a failed step
/// never affects the next one.
pub struct TradingEngine {
    broker: Arc<dyn Broker>,
    decider: Arc<dyn DecisionSource>,
    sizing: Arc<dyn SizingPolicy>,
    symbol: String,
}

impl TradingEngine {
    /// Create an engine trading `symbol` with one share per order.
    pub fn new(
        broker: Arc<dyn Broker>,
        decider: Arc<dyn DecisionSource>,
        symbol: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            broker,
            decider,
            sizing: Arc::new(FixedQuantity::default()),
            symbol: normalize_symbol(symbol)?,
        })
    }

    /// Replace the sizing policy.
    pub fn with_sizing(mut self, sizing: Arc<dyn SizingPolicy>) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn broker_name(&self) -> &str {
        self.broker.name()
    }

    pub fn decider_name(&self) -> &str {
        self.decider.name()
    }

    /// Run one fetch-decide-maybe-submit cycle.
    ///
    /// Fails only when the price cannot be fetched. An order the brokerage
    /// refuses is logged and reported in the outcome; the step still succeeds.
    pub async fn step(&self) -> Result<StepOutcome, BrokerError> {
        let quote = self.broker.get_latest_trade(&self.symbol).await?;
        let price = quote.price;

        let decision = self.decider.decide(price).await;
        info!(symbol = %self.symbol, "Price: {} Decision: {}", price.round_dp(2), decision);

        let order = match decision.side() {
            None => OrderOutcome::NotRequired,
            Some(side) => self.place(side, decision, price).await,
        };

        Ok(StepOutcome {
            symbol: self.symbol.clone(),
            decision,
            price,
            quote_time: quote.timestamp,
            order,
        })
    }

    async fn place(&self, side: Side, decision: Decision, price: Decimal) -> OrderOutcome {
        let quantity = self.sizing.quantity(decision, price);
        if quantity < Decimal::ONE {
            warn!(symbol = %self.symbol, %side, %quantity, "Sizing produced less than one share, not ordering");
            return OrderOutcome::Skipped { quantity };
        }
        if !quantity.fract().is_zero() {
            warn!(symbol = %self.symbol, %side, %quantity, "Sizing produced a fractional quantity, not ordering");
            return OrderOutcome::Skipped { quantity };
        }

        info!("Submitting {} order for {} {}", side, quantity, self.symbol);
        let request = OrderRequest::market(&self.symbol, side, quantity);

        match self.broker.submit_order(request).await {
            Ok(ack) => OrderOutcome::Submitted(ack),
            Err(e) => {
                error!(
                    symbol = %self.symbol,
                    %side,
                    %quantity,
                    kind = e.kind(),
                    error = %e,
                    "Order submission failed"
                );
                OrderOutcome::Failed {
                    side,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Pull cash and positions for display.
    pub async fn portfolio_snapshot(&self) -> Result<PortfolioSnapshot, BrokerError> {
        self.broker.portfolio_snapshot().await
    }
}
