//! Application layer containing the order settlement pipeline.
//!
//! `SettlementEngine` is the entry point: it persists orders, fans strategy
//! requests out across instruments and spawns one detached `tokio` task per
//! order to run the `Settlement` state machine against the shared
//! `PriceCache` and the retrying `PaymentStatusClient`.

pub mod engine;
pub mod fan_out;
pub mod idempotency;
pub mod payment_status;
pub mod price_cache;
pub mod settlement;
