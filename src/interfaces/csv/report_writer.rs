use crate::domain::holding::Holding;
use crate::domain::order::Order;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct HoldingRow<'a> {
    owner: &'a str,
    instrument: &'a str,
    total_amount: Decimal,
    units: Decimal,
    market_value: Decimal,
}

#[derive(Debug, Serialize)]
struct OrderRow<'a> {
    id: &'a str,
    owner: &'a str,
    instrument: &'a str,
    amount: Decimal,
    units: Decimal,
    price_per_unit: Decimal,
    status: String,
    payment: &'a str,
}

/// Writes settlement reports as CSV. Decimals are normalized (`10`, not `10.0000`).
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes the header row even when there are no holdings.
    pub fn write_holdings<'a>(
        &mut self,
        holdings: impl IntoIterator<Item = (&'a str, &'a Holding)>,
    ) -> Result<()> {
        self.writer.write_record([
            "owner",
            "instrument",
            "total_amount",
            "units",
            "market_value",
        ])?;
        for (owner, holding) in holdings {
            self.writer.serialize(HoldingRow {
                owner,
                instrument: &holding.instrument,
                total_amount: holding.total_amount.normalize(),
                units: holding.units.normalize(),
                market_value: holding.market_value.normalize(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        self.writer.write_record([
            "id",
            "owner",
            "instrument",
            "amount",
            "units",
            "price_per_unit",
            "status",
            "payment",
        ])?;
        for order in orders {
            self.writer.serialize(OrderRow {
                id: order.id.as_str(),
                owner: &order.owner,
                instrument: &order.instrument,
                amount: order.amount.value().normalize(),
                units: order.units.normalize(),
                price_per_unit: order.price_per_unit.normalize(),
                status: order.status.to_string(),
                payment: order.payment_id.as_str(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
