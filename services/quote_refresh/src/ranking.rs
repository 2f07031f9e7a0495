//! Candidate ranking policies
//!
//! Pure functions over a candidate slice. Called on read; the stored result
//! keeps the provider's order so switching policy never needs a refetch.

use quote_types::QuoteCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordering applied to a candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    /// Provider order, which already encodes a profit-weighted ranking
    #[default]
    MostProfit,
    /// Best amount for the fixed side of the order
    MostReturn,
    /// Cheapest estimated network fee first
    LeastGas,
}

impl RankingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingPolicy::MostProfit => "most-profit",
            RankingPolicy::MostReturn => "most-return",
            RankingPolicy::LeastGas => "least-gas",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most-profit" | "most_profit" => Ok(RankingPolicy::MostProfit),
            "most-return" | "most_return" => Ok(RankingPolicy::MostReturn),
            "least-gas" | "least_gas" => Ok(RankingPolicy::LeastGas),
            other => Err(format!("unknown ranking policy '{}'", other)),
        }
    }
}

/// Order `candidates` under `policy`.
///
/// Returns a new vector; equal keys keep their relative input order.
/// `is_buy_order` only matters for [`RankingPolicy::MostReturn`]: a buy order
/// fixes the output so the cheapest `sell_amount` wins, a sell order fixes the
/// input so the largest `buy_amount` wins.
pub fn rank(
    candidates: &[QuoteCandidate],
    policy: RankingPolicy,
    is_buy_order: bool,
) -> Vec<QuoteCandidate> {
    let mut ranked = candidates.to_vec();

    // slice::sort_by is stable
    match policy {
        RankingPolicy::MostProfit => {}
        RankingPolicy::LeastGas => {
            ranked.sort_by(|a, b| a.estimated_gas_cost().cmp(&b.estimated_gas_cost()));
        }
        RankingPolicy::MostReturn if is_buy_order => {
            ranked.sort_by(|a, b| a.sell_amount.amount.cmp(&b.sell_amount.amount));
        }
        RankingPolicy::MostReturn => {
            ranked.sort_by(|a, b| b.buy_amount.amount.cmp(&a.buy_amount.amount));
        }
    }

    ranked
}
