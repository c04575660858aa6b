use crate::domain::instrument::Instrument;
use crate::error::{EngineError, Result};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared table of instruments and their current prices.
///
/// Every read and every refresh takes the same exclusive lock, so a refresh can
/// never land between reading a price and computing an allocation from it
/// (see [`PriceCache::with_instrument`]). Cloning shares the table.
#[derive(Clone, Default)]
pub struct PriceCache {
    instruments: Arc<Mutex<HashMap<String, Instrument>>>,
}

impl PriceCache {
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let table = instruments
            .into_iter()
            .map(|instrument| (instrument.name.clone(), instrument))
            .collect();
        Self {
            instruments: Arc::new(Mutex::new(table)),
        }
    }

    /// Current price of `name`, or `None` on a lookup miss.
    pub async fn current_price(&self, name: &str) -> Option<Decimal> {
        self.instruments.lock().await.get(name).map(Instrument::price)
    }

    /// Runs `f` against the instrument while holding the table lock.
    pub async fn with_instrument<T>(
        &self,
        name: &str,
        f: impl FnOnce(Option<&Instrument>) -> T,
    ) -> T {
        let table = self.instruments.lock().await;
        f(table.get(name))
    }

    /// All current prices, read under one lock.
    pub async fn snapshot(&self) -> HashMap<String, Decimal> {
        self.instruments
            .lock()
            .await
            .values()
            .map(|instrument| (instrument.name.clone(), instrument.price()))
            .collect()
    }

    /// Redraws every price uniformly within its band.
    pub async fn refresh(&self) {
        let mut table = self.instruments.lock().await;
        let mut rng = rand::thread_rng();
        for instrument in table.values_mut() {
            instrument.reprice(&mut rng);
        }
        debug!(instruments = table.len(), "Prices refreshed");
    }

    /// Same as [`refresh`](Self::refresh) with a caller-supplied generator.
    pub async fn refresh_with<R: Rng + Send>(&self, rng: &mut R) {
        let mut table = self.instruments.lock().await;
        for instrument in table.values_mut() {
            instrument.reprice(rng);
        }
    }

    pub async fn set_price(&self, name: &str, price: Decimal) -> Result<()> {
        let mut table = self.instruments.lock().await;
        table
            .get_mut(name)
            .ok_or_else(|| EngineError::InstrumentNotFound(name.to_string()))?
            .set_price(price)
    }

    pub async fn insert(&self, instrument: Instrument) {
        self.instruments
            .lock()
            .await
            .insert(instrument.name.clone(), instrument);
    }

    pub async fn remove(&self, name: &str) -> Option<Instrument> {
        self.instruments.lock().await.remove(name)
    }

    /// Refreshes immediately and then every `interval`. Do not await the returned
    /// handle, the task runs until it is aborted or the runtime shuts down.
    ///
    /// Panics inside tokio if `interval` is zero; callers validate it through
    /// [`EngineConfig::validate`](crate::config::EngineConfig::validate).
    pub fn spawn_refresher(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            info!(?interval, "Price refresher started");
            loop {
                timer.tick().await;
                cache.refresh().await;
            }
        })
    }
}
