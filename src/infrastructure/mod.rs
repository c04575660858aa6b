//! Adapters implementing the domain ports.

pub mod http_payment;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
