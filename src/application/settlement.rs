use super::idempotency::IdempotencyGuard;
use super::payment_status::PaymentStatusClient;
use super::price_cache::PriceCache;
use crate::domain::amount::Amount;
use crate::domain::order::{OrderId, OrderStatus, TerminalUpdate};
use crate::domain::ports::OrderStoreRef;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Drives one order from `Submitted` to a terminal state.
///
/// 1. load the order
/// 2. idempotency check; a payment that already settled another order forces `Failed`
/// 3. otherwise resolve the payment status (with retries)
/// 4. wait out the simulated clearing time
/// 5. price the allocation under the cache lock and write the terminal update
pub struct Settlement {
    orders: OrderStoreRef,
    prices: PriceCache,
    payments: PaymentStatusClient,
    guard: IdempotencyGuard,
    delay: Duration,
}

impl Settlement {
    pub fn new(
        orders: OrderStoreRef,
        prices: PriceCache,
        payments: PaymentStatusClient,
        delay: Duration,
    ) -> Self {
        let guard = IdempotencyGuard::new(orders.clone());
        Self {
            orders,
            prices,
            payments,
            guard,
            delay,
        }
    }

    /// Settles `order_id` and returns the status written.
    ///
    /// An order that is already terminal is left untouched and its status returned.
    pub async fn settle(&self, order_id: &OrderId) -> Result<OrderStatus> {
        info!(%order_id, "Processing order");
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.clone()))?;
        if order.status.is_terminal() {
            return Ok(order.status);
        }

        let paid = if self.guard.already_settled(&order.payment_id).await? {
            info!(%order_id, payment_id = %order.payment_id, "Payment already processed");
            false
        } else {
            let outcome = self.payments.resolve(&order.payment_id).await;
            info!(%order_id, ?outcome, "Payment status resolved");
            outcome.is_success()
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let amount = order.amount;
        let update = self
            .prices
            .with_instrument(&order.instrument, |instrument| {
                finalize(paid, amount, instrument.map(|i| i.price()), Utc::now())
            })
            .await;
        let status = update.status();
        self.orders.update_terminal(order_id, update).await?;
        info!(%order_id, %status, "Order status updated");
        Ok(status)
    }

    /// Runs [`settle`](Self::settle) on its own task. Errors are logged, never returned.
    pub fn spawn(self: &Arc<Self>, order_id: OrderId) -> JoinHandle<()> {
        let settlement = Arc::clone(self);
        tokio::spawn(async move {
            match settlement.settle(&order_id).await {
                Ok(_) => {}
                Err(e @ EngineError::OrderNotFound(_)) => {
                    warn!(%order_id, "Settlement aborted: {e}");
                }
                Err(e) => {
                    error!(%order_id, "Settlement aborted, order left as submitted: {e}");
                }
            }
        })
    }
}

/// Computes the terminal update for a settled order.
///
/// Succeeds only when the payment went through, the instrument is priced and
/// the amount buys at least one whole unit.
pub fn finalize(
    paid: bool,
    amount: Amount,
    price: Option<Decimal>,
    at: DateTime<Utc>,
) -> TerminalUpdate {
    let allocation = price.and_then(|p| amount.value().checked_div(p).map(|units| (units, p)));
    match allocation {
        Some((units, price_per_unit)) if paid && units >= Decimal::ONE => TerminalUpdate::Succeeded {
            units,
            price_per_unit,
            at,
        },
        _ => TerminalUpdate::Failed { at },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_finalize_allocates_units_at_price() {
        let update = finalize(true, amount(dec!(500)), Some(dec!(50)), Utc::now());
        assert!(matches!(
            update,
            TerminalUpdate::Succeeded { units, price_per_unit, .. }
                if units == dec!(10) && price_per_unit == dec!(50)
        ));
    }

    #[test]
    fn test_finalize_fractional_units() {
        let update = finalize(true, amount(dec!(75)), Some(dec!(50)), Utc::now());
        assert!(matches!(
            update,
            TerminalUpdate::Succeeded { units, .. } if units == dec!(1.5)
        ));
    }

    #[test]
    fn test_finalize_less_than_one_unit_fails() {
        let update = finalize(true, amount(dec!(55)), Some(dec!(60)), Utc::now());
        assert_eq!(update.status(), OrderStatus::Failed);
    }

    #[test]
    fn test_finalize_exactly_one_unit_succeeds() {
        let update = finalize(true, amount(dec!(60)), Some(dec!(60)), Utc::now());
        assert_eq!(update.status(), OrderStatus::Succeeded);
    }

    #[test]
    fn test_finalize_unpaid_fails() {
        let update = finalize(false, amount(dec!(500)), Some(dec!(50)), Utc::now());
        assert_eq!(update.status(), OrderStatus::Failed);
    }

    #[test]
    fn test_finalize_unknown_instrument_fails() {
        let update = finalize(true, amount(dec!(500)), None, Utc::now());
        assert_eq!(update.status(), OrderStatus::Failed);
    }
}
