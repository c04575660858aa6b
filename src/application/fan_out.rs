use super::engine::SettlementEngine;
use crate::domain::order::{Order, OrderRequest};
use crate::domain::strategy::StrategyRequest;
use crate::error::Result;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

impl SettlementEngine {
    /// Splits one funding amount across a strategy.
    ///
    /// Creates one order per strategy entry, all sharing the request's payment id,
    /// concurrently. Returns once every creation has finished, in strategy order;
    /// settlement of the sub-orders carries on independently afterwards. A
    /// sub-order that cannot be created is logged and left out.
    pub async fn execute_strategy(&self, request: StrategyRequest) -> Result<Vec<Order>> {
        let strategy = self.strategies.get(&request.strategy)?;

        let mut creations = JoinSet::new();
        let allocations = strategy.allocate(request.amount);
        for (position, (allocation, amount)) in allocations.into_iter().enumerate() {
            let amount = match amount {
                Ok(amount) => amount,
                Err(e) => {
                    warn!(instrument = %allocation.instrument, "Skipping strategy entry: {e}");
                    continue;
                }
            };
            let order_request = OrderRequest {
                owner: request.owner.clone(),
                instrument: allocation.instrument.clone(),
                amount,
                payment_id: request.payment_id.clone(),
            };
            let engine = self.clone();
            creations.spawn(async move { (position, engine.submit_order(order_request).await) });
        }

        let mut created = Vec::with_capacity(creations.len());
        while let Some(joined) = creations.join_next().await {
            match joined {
                Ok((position, Ok(order))) => created.push((position, order)),
                Ok((_, Err(e))) => error!("Error creating strategy order: {e}"),
                Err(e) => error!("Strategy order task failed: {e}"),
            }
        }
        created.sort_by_key(|(position, _)| *position);

        info!(
            strategy = %request.strategy,
            payment_id = %request.payment_id,
            orders = created.len(),
            "Strategy orders created"
        );
        Ok(created.into_iter().map(|(_, order)| order).collect())
    }
}
