use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregated succeeded position of one owner in one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub instrument: String,
    /// Sum of the funding amounts of the succeeded orders.
    pub total_amount: Decimal,
    pub units: Decimal,
    /// `units` valued at the instrument's current price.
    pub market_value: Decimal,
}
