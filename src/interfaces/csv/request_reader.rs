use crate::domain::amount::Amount;
use crate::domain::order::{OrderRequest, PaymentId};
use crate::domain::strategy::StrategyRequest;
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Order,
    Strategy,
}

/// One row of the funding requests file.
///
/// `target` names an instrument for `order` rows and a strategy for `strategy` rows.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct FundingRequest {
    pub kind: RequestKind,
    pub owner: String,
    pub target: String,
    pub amount: Decimal,
    pub payment: String,
}

/// A validated request, ready for the engine.
#[derive(Debug, PartialEq, Clone)]
pub enum Submission {
    Order(OrderRequest),
    Strategy(StrategyRequest),
}

impl TryFrom<FundingRequest> for Submission {
    type Error = EngineError;

    fn try_from(row: FundingRequest) -> Result<Self> {
        let amount = Amount::new(row.amount)?;
        let payment_id = PaymentId::new(row.payment);
        Ok(match row.kind {
            RequestKind::Order => Self::Order(OrderRequest {
                owner: row.owner,
                instrument: row.target,
                amount,
                payment_id,
            }),
            RequestKind::Strategy => Self::Strategy(StrategyRequest {
                owner: row.owner,
                strategy: row.target,
                amount,
                payment_id,
            }),
        })
    }
}

/// Reads funding requests from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Submission>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates requests.
    pub fn submissions(self) -> impl Iterator<Item = Result<Submission>> {
        self.reader
            .into_deserialize::<FundingRequest>()
            .map(|result| result.map_err(EngineError::from).and_then(Submission::try_from))
    }
}
