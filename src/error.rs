use crate::domain::order::OrderId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("Instrument not found: {0}")]
    InstrumentNotFound(String),
    #[error("Strategy not found: {0}")]
    StrategyNotFound(String),
    #[error("Payment status unavailable: {0}")]
    Transient(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EngineError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
