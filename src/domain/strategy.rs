use super::amount::Amount;
use super::order::PaymentId;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BUILTIN_STRATEGIES: &str = include_str!("strategies.json");

/// One weighted entry of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(rename = "name")]
    pub instrument: String,
    pub percentage: u32,
}

/// A named, read-only weighted list of instruments.
///
/// Percentages are applied independently to the funding amount and need not
/// sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "funds")]
    pub allocations: Vec<Allocation>,
}

impl Strategy {
    /// Splits `amount` into one sub-amount per allocation, in strategy order.
    pub fn allocate(&self, amount: Amount) -> Vec<(&Allocation, Result<Amount>)> {
        self.allocations
            .iter()
            .map(|allocation| (allocation, amount.percent(allocation.percentage)))
            .collect()
    }
}

/// A request to fan one payment out across a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRequest {
    pub owner: String,
    pub strategy: String,
    pub amount: Amount,
    pub payment_id: PaymentId,
}

/// Immutable lookup table of strategies by name.
#[derive(Debug, Clone, Default)]
pub struct StrategyBook {
    strategies: HashMap<String, Strategy>,
}

impl StrategyBook {
    pub fn new(strategies: impl IntoIterator<Item = Strategy>) -> Self {
        Self {
            strategies: strategies
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
        }
    }

    /// The Arbitrage, Balanced and Growth strategies.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_STRATEGIES)
    }

    /// Parses a JSON array of `{ name, description, funds: [{ name, percentage }] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let strategies: Vec<Strategy> = serde_json::from_str(json)?;
        Ok(Self::new(strategies))
    }

    pub fn get(&self, name: &str) -> Result<&Strategy> {
        self.strategies
            .get(name)
            .ok_or_else(|| EngineError::StrategyNotFound(name.to_string()))
    }
}
