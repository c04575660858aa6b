use super::amount::Amount;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque order identifier, generated when the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque payment identifier issued by the payment authority.
///
/// Several orders may carry the same payment id when one payment funds a
/// strategy fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaymentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitted,
    Succeeded,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Submitted)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submitted => "Submitted",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A request to fund a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub owner: String,
    pub instrument: String,
    pub amount: Amount,
    pub payment_id: PaymentId,
}

/// The single write that moves an order out of `Submitted`.
///
/// Units and price-per-unit only exist on the succeeded variant, so they can
/// only ever be recorded together with the `Succeeded` transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalUpdate {
    Succeeded {
        units: Decimal,
        price_per_unit: Decimal,
        at: DateTime<Utc>,
    },
    Failed {
        at: DateTime<Utc>,
    },
}

impl TerminalUpdate {
    pub fn status(&self) -> OrderStatus {
        match self {
            Self::Succeeded { .. } => OrderStatus::Succeeded,
            Self::Failed { .. } => OrderStatus::Failed,
        }
    }
}

/// A funding order and its settlement outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: String,
    pub instrument: String,
    pub amount: Amount,
    /// Units allocated at settlement. Zero until the order succeeds.
    pub units: Decimal,
    /// Instrument price used for the allocation. Zero until the order succeeds.
    pub price_per_unit: Decimal,
    pub status: OrderStatus,
    pub payment_id: PaymentId,
    pub submitted_at: DateTime<Utc>,
    pub succeeded_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a fresh `Submitted` order with a newly generated id.
    pub fn submit(request: OrderRequest) -> Self {
        Self {
            id: OrderId::generate(),
            owner: request.owner,
            instrument: request.instrument,
            amount: request.amount,
            units: Decimal::ZERO,
            price_per_unit: Decimal::ZERO,
            status: OrderStatus::Submitted,
            payment_id: request.payment_id,
            submitted_at: Utc::now(),
            succeeded_at: None,
            failed_at: None,
        }
    }

    /// Applies the terminal transition. An order leaves `Submitted` exactly once.
    pub fn apply(&mut self, update: TerminalUpdate) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::ValidationError(format!(
                "Order {} is already {}",
                self.id, self.status
            )));
        }
        match update {
            TerminalUpdate::Succeeded {
                units,
                price_per_unit,
                at,
            } => {
                self.units = units;
                self.price_per_unit = price_per_unit;
                self.status = OrderStatus::Succeeded;
                self.succeeded_at = Some(at);
            }
            TerminalUpdate::Failed { at } => {
                self.status = OrderStatus::Failed;
                self.failed_at = Some(at);
            }
        }
        Ok(())
    }
}
