#![allow(dead_code)]

use async_trait::async_trait;
use rta_engine::application::engine::SettlementEngine;
use rta_engine::application::price_cache::PriceCache;
use rta_engine::config::{EngineConfig, RetryPolicy};
use rta_engine::domain::amount::Amount;
use rta_engine::domain::instrument::Instrument;
use rta_engine::domain::order::{OrderRequest, PaymentId};
use rta_engine::domain::payment::PaymentStatus;
use rta_engine::domain::ports::{PaymentAuthority, PaymentAuthorityRef};
use rta_engine::domain::strategy::StrategyBook;
use rta_engine::error::{EngineError, Result};
use rta_engine::infrastructure::in_memory::{InMemoryOrderStore, StaticPaymentAuthority};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

pub const OWNER: &str = "9876543210";
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Fails `failures` times with a transient error, then answers `status`.
pub struct ScriptedAuthority {
    failures: u32,
    status: String,
    pub calls: AtomicU32,
}

impl ScriptedAuthority {
    pub fn new(failures: u32, status: &str) -> Self {
        Self {
            failures,
            status: status.to_string(),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl PaymentAuthority for ScriptedAuthority {
    async fn fetch_status(&self, _payment_id: &PaymentId) -> Result<PaymentStatus> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            Err(EngineError::Transient("gateway unreachable".to_string()))
        } else {
            Ok(PaymentStatus::from(self.status.as_str()))
        }
    }
}

/// Instruments whose band is a single price, so allocations are predictable.
pub fn fixed_prices(prices: &[(&str, Decimal)]) -> PriceCache {
    PriceCache::new(
        prices
            .iter()
            .map(|(name, price)| Instrument::new(*name, *price, *price).unwrap()),
    )
}

pub fn config(settlement_delay: Duration, retries: u32) -> EngineConfig {
    EngineConfig {
        settlement_delay,
        payment_retry: RetryPolicy {
            retries,
            delay: Duration::ZERO,
        },
        ..Default::default()
    }
}

pub struct Harness {
    pub engine: SettlementEngine,
    pub store: Arc<InMemoryOrderStore>,
}

pub fn harness_with(
    prices: PriceCache,
    authority: PaymentAuthorityRef,
    settlement_delay: Duration,
) -> Harness {
    let store = Arc::new(InMemoryOrderStore::new());
    let engine = SettlementEngine::new(
        store.clone(),
        authority,
        prices,
        StrategyBook::builtin().unwrap(),
        &config(settlement_delay, 2),
    );
    Harness { engine, store }
}

/// Engine over an in-memory store and a static payment table.
pub fn harness(
    prices: PriceCache,
    payments: &[(&str, &str)],
    settlement_delay: Duration,
) -> Harness {
    let authority = StaticPaymentAuthority::with_statuses(
        payments
            .iter()
            .map(|(id, status)| (PaymentId::from(*id), status.to_string())),
    );
    harness_with(prices, Arc::new(authority), settlement_delay)
}

pub fn order_request(instrument: &str, amount: Decimal, payment: &str) -> OrderRequest {
    OrderRequest {
        owner: OWNER.to_string(),
        instrument: instrument.to_string(),
        amount: Amount::new(amount).unwrap(),
        payment_id: PaymentId::from(payment),
    }
}

pub fn write_file(path: &Path, content: &str) -> std::result::Result<(), Error> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Writes `rows` single-instrument requests, each with its own payment id.
pub fn generate_requests(path: &Path, rows: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["kind", "owner", "target", "amount", "payment"])?;
    for i in 1..=rows {
        wtr.write_record(["order", OWNER, "Growth Fund 1", "100", &format!("pay-{i}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Matching payment table for [`generate_requests`], every payment successful.
pub fn generate_payments(path: &Path, rows: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["payment", "status"])?;
    for i in 1..=rows {
        wtr.write_record([format!("pay-{i}").as_str(), "Success"])?;
    }
    wtr.flush()?;
    Ok(())
}
