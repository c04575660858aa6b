use crate::domain::order::{Order, OrderId, OrderStatus, PaymentId, TerminalUpdate};
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::{OrderStore, PaymentAuthority};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access.
/// Ideal for testing or for runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<OrderId> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(EngineError::Persistence(format!(
                "Order {} already exists",
                order.id
            )));
        }
        let id = order.id.clone();
        orders.insert(id.clone(), order);
        Ok(id)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn find_succeeded_by_payment(&self, payment_id: &PaymentId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| &o.payment_id == payment_id && o.status == OrderStatus::Succeeded)
            .cloned())
    }

    async fn update_terminal(&self, id: &OrderId, update: TerminalUpdate) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders
            .get_mut(id)
            .ok_or_else(|| EngineError::OrderNotFound(id.clone()))?
            .apply(update)
    }

    async fn succeeded_by_owner(&self, owner: &str) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut succeeded: Vec<Order> = orders
            .values()
            .filter(|o| o.owner == owner && o.status == OrderStatus::Succeeded)
            .cloned()
            .collect();
        succeeded.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(succeeded)
    }
}

/// A payment authority answering from a fixed table of payment statuses.
///
/// Unknown payments fail the same way the remote gateway does for them: as a
/// transient error the engine retries.
#[derive(Default, Clone)]
pub struct StaticPaymentAuthority {
    statuses: Arc<RwLock<HashMap<PaymentId, String>>>,
}

impl StaticPaymentAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = (PaymentId, String)>) -> Self {
        Self {
            statuses: Arc::new(RwLock::new(statuses.into_iter().collect())),
        }
    }

    pub async fn set_status(&self, payment_id: PaymentId, status: impl Into<String>) {
        self.statuses.write().await.insert(payment_id, status.into());
    }
}

#[async_trait]
impl PaymentAuthority for StaticPaymentAuthority {
    async fn fetch_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus> {
        let statuses = self.statuses.read().await;
        let status = statuses
            .get(payment_id)
            .ok_or_else(|| EngineError::Transient(format!("Payment not found: {payment_id}")))?;
        Ok(PaymentStatus::from(status.as_str()))
    }
}
