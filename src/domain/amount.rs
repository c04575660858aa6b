use crate::error::EngineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive monetary amount used to fund an order.
///
/// Wraps `rust_decimal::Decimal` so that a zero or negative funding amount can
/// never reach the order store.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, EngineError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EngineError::ValidationError(format!(
                "Amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The share of this amount given by `percentage` (out of 100).
    ///
    /// Fails when the share is not itself a positive amount, e.g. a 0% weight,
    /// or when it does not fit in a `Decimal`.
    pub fn percent(&self, percentage: u32) -> Result<Self, EngineError> {
        let share = self
            .0
            .checked_mul(Decimal::from(percentage))
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                EngineError::ValidationError(format!(
                    "{percentage}% of {} is out of range",
                    self.0
                ))
            })?;
        Self::new(share)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
