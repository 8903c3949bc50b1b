//! In-memory fakes for engine and driver tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use trading_core::error::BrokerError;
use trading_core::traits::{Broker, DecisionSource};
use trading_core::types::{Account, Decision, OrderAck, OrderRequest, Position, Quote};

/// Broker serving scripted prices and recording submitted orders.
pub struct FakeBroker {
    prices: Mutex<VecDeque<Result<Decimal, BrokerError>>>,
    fallback_price: Decimal,
    reject_orders: bool,
    latency: Duration,
    pub orders: Mutex<Vec<OrderRequest>>,
    pub price_fetches: Mutex<usize>,
}

impl FakeBroker {
    pub fn new(fallback_price: Decimal) -> Self {
        Self {
            prices: Mutex::new(VecDeque::new()),
            fallback_price,
            reject_orders: false,
            latency: Duration::ZERO,
            orders: Mutex::new(Vec::new()),
            price_fetches: Mutex::new(0),
        }
    }

    /// Queue results returned by the next price fetches, in order.
    pub fn with_prices(self, prices: Vec<Result<Decimal, BrokerError>>) -> Self {
        *self.prices.lock().unwrap() = prices.into();
        self
    }

    pub fn rejecting_orders(mut self) -> Self {
        self.reject_orders = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broker for FakeBroker {
    async fn get_latest_trade(&self, symbol: &str) -> Result<Quote, BrokerError> {
        *self.price_fetches.lock().unwrap() += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.prices.lock().unwrap().pop_front();
        let price = next.unwrap_or(Ok(self.fallback_price))?;
        Ok(Quote::new(symbol, price, Utc::now(), 100))
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        self.orders.lock().unwrap().push(request.clone());
        if self.reject_orders {
            return Err(BrokerError::OrderRejected("insufficient buying power".into()));
        }
        Ok(OrderAck {
            id: format!("order-{}", self.orders.lock().unwrap().len()),
            client_order_id: request.client_order_id,
            symbol: request.symbol,
            side: request.side,
            quantity: request.quantity,
            status: "accepted".into(),
            submitted_at: Some(Utc::now()),
        })
    }

    async fn get_account(&self) -> Result<Account, BrokerError> {
        Ok(Account {
            cash: Decimal::from(10_000),
            buying_power: Decimal::from(20_000),
            equity: Decimal::from(10_000),
        })
    }

    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError> {
        Ok(vec![Position::new("AAPL", Decimal::from(2), self.fallback_price)])
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Decision source replaying a script, then holding.
pub struct ScriptedDecisions {
    script: Mutex<VecDeque<Decision>>,
    pub calls: Mutex<Vec<Decimal>>,
}

impl ScriptedDecisions {
    pub fn new(script: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(decision: Decision) -> Self {
        Self::new(vec![decision; 64])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionSource for ScriptedDecisions {
    async fn decide(&self, last_price: Decimal) -> Decision {
        self.calls.lock().unwrap().push(last_price);
        self.script.lock().unwrap().pop_front().unwrap_or(Decision::Hold)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
