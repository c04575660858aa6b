use crate::domain::order::PaymentId;
use crate::domain::ports::OrderStoreRef;
use crate::error::Result;

/// Keeps one payment from funding more than one successful settlement.
///
/// The check is a plain read against the order store. Two settlements for the
/// same payment that both read before either writes `Succeeded` will both pass.
#[derive(Clone)]
pub struct IdempotencyGuard {
    orders: OrderStoreRef,
}

impl IdempotencyGuard {
    pub fn new(orders: OrderStoreRef) -> Self {
        Self { orders }
    }

    pub async fn already_settled(&self, payment_id: &PaymentId) -> Result<bool> {
        Ok(self
            .orders
            .find_succeeded_by_payment(payment_id)
            .await?
            .is_some())
    }
}
