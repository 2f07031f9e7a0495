//! Quote candidate types as returned by an aggregating quote provider

use crate::precision::{base_units, TokenAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network-fee aggressiveness requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreference {
    Standard,
    Fast,
    Instant,
}

impl SpeedPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreference::Standard => "standard",
            SpeedPreference::Fast => "fast",
            SpeedPreference::Instant => "instant",
        }
    }
}

impl fmt::Display for SpeedPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeedPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(SpeedPreference::Standard),
            "fast" => Ok(SpeedPreference::Fast),
            "instant" => Ok(SpeedPreference::Instant),
            other => Err(format!("unknown speed preference '{}'", other)),
        }
    }
}

/// Route (swapper) that produced a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSource {
    pub id: String,
    pub name: String,
}

/// Fee estimate attached to a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCost {
    /// Gas units the route is expected to consume
    #[serde(default)]
    pub estimated_gas: u64,
    /// Total cost in fee-currency base units (wei)
    #[serde(with = "base_units")]
    pub estimated_cost: u128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_in_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_token_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "estimatedCostInUSD")]
    pub estimated_cost_in_usd: Option<Decimal>,
}

impl GasCost {
    pub fn new(estimated_gas: u64, estimated_cost: u128) -> Self {
        Self {
            estimated_gas,
            estimated_cost,
            estimated_cost_in_units: None,
            gas_token_symbol: None,
            estimated_cost_in_usd: None,
        }
    }
}

/// One route's offer. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCandidate {
    #[serde(rename = "swapper")]
    pub source: RouteSource,
    pub sell_amount: TokenAmount,
    pub buy_amount: TokenAmount,
    /// Upper bound on what the user pays once slippage is applied (buy orders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sell_amount: Option<TokenAmount>,
    /// Lower bound on what the user receives once slippage is applied (sell orders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_buy_amount: Option<TokenAmount>,
    pub gas: GasCost,
}

impl QuoteCandidate {
    pub fn estimated_gas_cost(&self) -> u128 {
        self.gas.estimated_cost
    }
}
