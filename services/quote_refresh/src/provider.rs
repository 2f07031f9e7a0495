//! Quote provider seam
//!
//! The engine never prices anything itself. It hands a [`QuoteRequest`] to a
//! [`QuoteProvider`] and records whatever comes back.

use async_trait::async_trait;
use quote_types::{Asset, Decimal, NetworkId, QuoteCandidate, SpeedPreference};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::ranking::RankingPolicy;

/// The fixed side of an order, in base units.
///
/// An enum so a request can never carry both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderAmount {
    /// Sell exactly this much of `sell_asset`
    Sell(u128),
    /// Buy exactly this much of `buy_asset`
    Buy(u128),
}

impl OrderAmount {
    pub fn base_units(&self) -> u128 {
        match self {
            OrderAmount::Sell(units) | OrderAmount::Buy(units) => *units,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, OrderAmount::Buy(_))
    }
}

/// Request handed to the provider for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    pub amount: OrderAmount,
    /// Advisory ordering; callers re-rank with [`crate::rank`]
    pub ranking_hint: RankingPolicy,
    pub recipient: Option<String>,
    pub slippage_tolerance: Option<Decimal>,
    pub speed_preference: Option<SpeedPreference>,
    pub account: Option<String>,
    pub network_id: NetworkId,
}

/// Aggregated quote source.
///
/// `Ok(vec![])` means every route failed and is not an error; `Err` is a
/// failure of the call itself. Timeouts belong to the implementation.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    async fn quote(&self, request: QuoteRequest) -> Result<Vec<QuoteCandidate>, ProviderError>;
}
