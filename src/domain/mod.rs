//! Domain types and the ports the settlement engine consumes.

pub mod amount;
pub mod holding;
pub mod instrument;
pub mod order;
pub mod payment;
pub mod ports;
pub mod strategy;
