use super::order::{Order, OrderId, PaymentId, TerminalUpdate};
use super::payment::PaymentStatus;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable record of orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new `Submitted` order.
    async fn create(&self, order: Order) -> Result<OrderId>;
    async fn get(&self, id: &OrderId) -> Result<Option<Order>>;
    /// Any order carrying `payment_id` that has already succeeded.
    async fn find_succeeded_by_payment(&self, payment_id: &PaymentId) -> Result<Option<Order>>;
    /// Moves an order out of `Submitted`; refuses orders that are already terminal.
    async fn update_terminal(&self, id: &OrderId, update: TerminalUpdate) -> Result<()>;
    async fn succeeded_by_owner(&self, owner: &str) -> Result<Vec<Order>>;
}

/// Remote authority answering a payment's outcome by id.
#[async_trait]
pub trait PaymentAuthority: Send + Sync {
    /// Fails with `EngineError::Transient` on network or decoding failure.
    async fn fetch_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus>;
}

pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type PaymentAuthorityRef = Arc<dyn PaymentAuthority>;
