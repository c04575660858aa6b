use crate::domain::order::{Order, OrderId, OrderStatus, PaymentId, TerminalUpdate};
use crate::domain::ports::OrderStore;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing orders by id.
pub const CF_ORDERS: &str = "orders";
/// Column Family indexing succeeded orders by payment id.
pub const CF_SETTLED_PAYMENTS: &str = "settled_payments";

/// A persistent order store implementation using RocksDB.
///
/// Orders are stored as JSON under their id. The `Succeeded` transition also
/// writes the payment id into a separate index, in the same batch, so the
/// idempotency lookup is a point read rather than a scan.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "settled_payments") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_settled = ColumnFamilyDescriptor::new(CF_SETTLED_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_settled])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| EngineError::Persistence(format!("Column family {name} not found")))
    }

    fn read_order(&self, key: &[u8]) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn encode(order: &Order) -> Result<Vec<u8>> {
    serde_json::to_vec(order)
        .map_err(|e| EngineError::Persistence(format!("Serialization error: {e}")))
}

fn decode(bytes: &[u8]) -> Result<Order> {
    serde_json::from_slice(bytes)
        .map_err(|e| EngineError::Persistence(format!("Deserialization error: {e}")))
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn create(&self, order: Order) -> Result<OrderId> {
        let cf = self.cf(CF_ORDERS)?;
        let key = order.id.as_str().as_bytes();
        if self.db.get_pinned_cf(cf, key)?.is_some() {
            return Err(EngineError::Persistence(format!(
                "Order {} already exists",
                order.id
            )));
        }
        self.db.put_cf(cf, key, encode(&order)?)?;
        Ok(order.id)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        self.read_order(id.as_str().as_bytes())
    }

    async fn find_succeeded_by_payment(&self, payment_id: &PaymentId) -> Result<Option<Order>> {
        let cf = self.cf(CF_SETTLED_PAYMENTS)?;
        match self.db.get_cf(cf, payment_id.as_str().as_bytes())? {
            Some(order_key) => self.read_order(&order_key),
            None => Ok(None),
        }
    }

    async fn update_terminal(&self, id: &OrderId, update: TerminalUpdate) -> Result<()> {
        let mut order = self
            .read_order(id.as_str().as_bytes())?
            .ok_or_else(|| EngineError::OrderNotFound(id.clone()))?;
        order.apply(update)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ORDERS)?, id.as_str().as_bytes(), encode(&order)?);
        if order.status == OrderStatus::Succeeded {
            batch.put_cf(
                self.cf(CF_SETTLED_PAYMENTS)?,
                order.payment_id.as_str().as_bytes(),
                id.as_str().as_bytes(),
            );
        }
        self.db.write(batch)?;
        Ok(())
    }

    async fn succeeded_by_owner(&self, owner: &str) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut succeeded = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            let order = decode(&value)?;
            if order.owner == owner && order.status == OrderStatus::Succeeded {
                succeeded.push(order);
            }
        }
        succeeded.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(succeeded)
    }
}
