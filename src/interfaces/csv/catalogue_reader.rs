use crate::domain::instrument::Instrument;
use crate::domain::order::PaymentId;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct InstrumentRow {
    name: String,
    min: Decimal,
    max: Decimal,
}

#[derive(Debug, Deserialize)]
struct PaymentRow {
    payment: String,
    status: String,
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

/// Reads `name, min, max` rows into instruments. Any invalid band fails the whole file.
pub fn read_instruments<R: Read>(source: R) -> Result<Vec<Instrument>> {
    reader(source)
        .into_deserialize::<InstrumentRow>()
        .map(|row| {
            let row = row?;
            Instrument::new(row.name, row.min, row.max)
        })
        .collect()
}

/// Reads `payment, status` rows, e.g. the outcome table of an offline payment gateway.
pub fn read_payments<R: Read>(source: R) -> Result<Vec<(PaymentId, String)>> {
    reader(source)
        .into_deserialize::<PaymentRow>()
        .map(|row| {
            let row = row?;
            Ok((PaymentId::new(row.payment), row.status))
        })
        .collect()
}
