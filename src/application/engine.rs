use super::payment_status::PaymentStatusClient;
use super::price_cache::PriceCache;
use super::settlement::Settlement;
use crate::config::EngineConfig;
use crate::domain::holding::Holding;
use crate::domain::order::{Order, OrderId, OrderRequest};
use crate::domain::ports::{OrderStoreRef, PaymentAuthorityRef};
use crate::domain::strategy::StrategyBook;
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The entry point the request layer talks to.
///
/// `SettlementEngine` creates orders and hands each one to a detached settlement
/// task. Callers never wait for settlement: they get the `Submitted` order back
/// and observe the outcome by polling [`order`](Self::order). Cloning is cheap and
/// shares the store, price cache and strategy book.
#[derive(Clone)]
pub struct SettlementEngine {
    pub(super) orders: OrderStoreRef,
    pub(super) prices: PriceCache,
    pub(super) settlement: Arc<Settlement>,
    pub(super) strategies: Arc<StrategyBook>,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine`.
    ///
    /// # Arguments
    ///
    /// * `orders` - The store for order records.
    /// * `authority` - The payment authority consulted during settlement.
    /// * `prices` - The shared price cache. Its refresher is started separately.
    /// * `strategies` - The strategies available for fan-out.
    /// * `config` - Settlement delay and payment retry policy.
    pub fn new(
        orders: OrderStoreRef,
        authority: PaymentAuthorityRef,
        prices: PriceCache,
        strategies: StrategyBook,
        config: &EngineConfig,
    ) -> Self {
        let payments = PaymentStatusClient::new(authority, config.payment_retry);
        let settlement = Settlement::new(
            orders.clone(),
            prices.clone(),
            payments,
            config.settlement_delay,
        );
        Self {
            orders,
            prices,
            settlement: Arc::new(settlement),
            strategies: Arc::new(strategies),
        }
    }

    /// Persists a `Submitted` order and launches its settlement.
    ///
    /// Returns as soon as the order is stored. Settlement faults are never
    /// reported here.
    pub async fn submit_order(&self, request: OrderRequest) -> Result<Order> {
        let order = Order::submit(request);
        let id = self.orders.create(order.clone()).await?;
        info!(order_id = %id, instrument = %order.instrument, amount = %order.amount, "Order submitted");
        self.settlement.spawn(id);
        Ok(order)
    }

    /// Current snapshot of an order, possibly still `Submitted`.
    pub async fn order(&self, id: &OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound(id.clone()))
    }

    /// Polls until the order is terminal or `timeout` elapses, then returns the
    /// latest snapshot either way.
    pub async fn await_terminal(&self, id: &OrderId, timeout: Duration) -> Result<Order> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let order = self.order(id).await?;
            if order.status.is_terminal() || tokio::time::Instant::now() >= deadline {
                return Ok(order);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn current_price(&self, instrument: &str) -> Result<Decimal> {
        self.prices
            .current_price(instrument)
            .await
            .ok_or_else(|| EngineError::InstrumentNotFound(instrument.to_string()))
    }

    /// Succeeded holdings of `owner`, one entry per instrument ordered by name,
    /// valued at current prices.
    pub async fn holdings(&self, owner: &str) -> Result<Vec<Holding>> {
        let mut totals: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for order in self.orders.succeeded_by_owner(owner).await? {
            let (amount, units) = totals.entry(order.instrument.clone()).or_default();
            *amount = amount
                .checked_add(order.amount.value())
                .ok_or_else(|| out_of_range(&order.instrument))?;
            *units = units
                .checked_add(order.units)
                .ok_or_else(|| out_of_range(&order.instrument))?;
        }

        let prices = self.prices.snapshot().await;
        totals
            .into_iter()
            .map(|(instrument, (total_amount, units))| {
                let price = prices
                    .get(&instrument)
                    .copied()
                    .ok_or_else(|| EngineError::InstrumentNotFound(instrument.clone()))?;
                let market_value = units
                    .checked_mul(price)
                    .ok_or_else(|| out_of_range(&instrument))?;
                Ok(Holding {
                    instrument,
                    total_amount,
                    units,
                    market_value,
                })
            })
            .collect()
    }

    pub fn prices(&self) -> &PriceCache {
        &self.prices
    }

    /// The state machine behind every spawned settlement.
    pub fn settlement(&self) -> &Arc<Settlement> {
        &self.settlement
    }
}

fn out_of_range(instrument: &str) -> EngineError {
    EngineError::ValidationError(format!("Holding in {instrument} is out of range"))
}
