use crate::error::EngineError;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Decimal places kept on a drawn price.
pub const PRICE_SCALE: u32 = 4;

/// The fixed range an instrument's price is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    min: Decimal,
    max: Decimal,
}

impl PriceBand {
    /// Builds a band with `0 < min <= max`.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, EngineError> {
        if min <= Decimal::ZERO {
            return Err(EngineError::ValidationError(format!(
                "Price band minimum must be positive, got {min}"
            )));
        }
        if min > max {
            return Err(EngineError::ValidationError(format!(
                "Price band minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }

    /// Draws a price uniformly from the band.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let fraction = Decimal::from_f64(rng.r#gen::<f64>()).unwrap_or(Decimal::ZERO);
        (self.min + (self.max - self.min) * fraction)
            .round_dp(PRICE_SCALE)
            .clamp(self.min, self.max)
    }
}

/// A tradable fund with a fixed band and a current price inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    band: PriceBand,
    price: Decimal,
}

impl Instrument {
    /// Creates an instrument priced at the bottom of its band until the first refresh.
    pub fn new(name: impl Into<String>, min: Decimal, max: Decimal) -> Result<Self, EngineError> {
        let band = PriceBand::new(min, max)?;
        Ok(Self {
            name: name.into(),
            band,
            price: band.min(),
        })
    }

    pub fn band(&self) -> PriceBand {
        self.band
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn reprice<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.price = self.band.sample(rng);
    }

    /// Pins the price to a specific value inside the band.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), EngineError> {
        if !self.band.contains(price) {
            return Err(EngineError::ValidationError(format!(
                "Price {price} is outside the band [{}, {}] of {}",
                self.band.min(),
                self.band.max(),
                self.name
            )));
        }
        self.price = price;
        Ok(())
    }
}

/// The funds offered out of the box, with their price bands.
pub fn default_catalogue() -> Vec<Instrument> {
    [
        ("Arbitrage Fund 1", dec!(10), dec!(20)),
        ("Arbitrage Fund 2", dec!(10), dec!(30)),
        ("Arbitrage Fund 3", dec!(100), dec!(200)),
        ("Arbitrage Fund 4", dec!(50), dec!(60)),
        ("Balanced Fund 1", dec!(20), dec!(100)),
        ("Balanced Fund 2", dec!(10), dec!(200)),
        ("Balanced Fund 3", dec!(60), dec!(300)),
        ("Balanced Fund 4", dec!(100), dec!(400)),
        ("Balanced Fund 5", dec!(200), dec!(300)),
        ("Growth Fund 1", dec!(50), dec!(100)),
        ("Growth Fund 2", dec!(60), dec!(150)),
        ("Growth Fund 3", dec!(70), dec!(200)),
        ("Growth Fund 4", dec!(80), dec!(250)),
        ("Growth Fund 5", dec!(90), dec!(300)),
    ]
    .into_iter()
    .filter_map(|(name, min, max)| Instrument::new(name, min, max).ok())
    .collect()
}
