//! # Request Snapshot - Immutable Quote Request Inputs
//!
//! ## Purpose
//!
//! Captures everything that can invalidate a previously fetched quote in one
//! immutable value: the two assets, the typed amount and its direction, the
//! optional recipient / slippage / fee speed, plus the account and network the
//! wallet reports. Change detection in the refresh engine is plain field-wise
//! equality over this value.
//!
//! ## Integration Points
//!
//! - **Input Sources**: caller form fields, wallet account and network
//! - **Output Destinations**: [`crate::state::RefreshState`] change detection,
//!   [`crate::provider::QuoteRequest`] translation
//!
//! ## Examples
//!
//! ```rust
//! use quote_refresh::RequestSnapshot;
//! use quote_types::{Asset, NetworkId};
//!
//! let snapshot = RequestSnapshot::builder()
//!     .from_asset(Asset::new("0xA0b8", "USDC", 6))
//!     .to_asset(Asset::new("0xC02a", "WETH", 18))
//!     .amount("250")
//!     .account("0xabc")
//!     .network_id(NetworkId::ETHEREUM)
//!     .build();
//!
//! assert!(snapshot.is_actionable());
//! ```

use quote_types::{
    is_positive_amount, parse_units, Asset, Decimal, NetworkId, PrecisionError, SpeedPreference,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::provider::{OrderAmount, QuoteRequest};
use crate::ranking::RankingPolicy;

/// Everything that can invalidate a prior quote result
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestSnapshot {
    pub from_asset: Option<Asset>,
    pub to_asset: Option<Asset>,
    /// Human-unit decimal string, exactly as typed
    pub amount: String,
    /// `true`: `amount` is the desired output; `false`: the offered input
    pub is_buy_order: bool,
    pub recipient_override: Option<String>,
    /// Tolerance in percent (0.5 = 0.5%)
    pub slippage_tolerance: Option<Decimal>,
    pub speed_preference: Option<SpeedPreference>,
    /// Active signer address, empty when no wallet is connected
    pub account: String,
    pub network_id: NetworkId,
}

impl RequestSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Amount as a decimal, `None` when empty or unparseable
    pub fn parsed_amount(&self) -> Option<Decimal> {
        let trimmed = self.amount.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed).ok()
    }

    /// Both assets chosen and a strictly positive amount typed, of any magnitude
    pub fn is_actionable(&self) -> bool {
        self.from_asset.is_some() && self.to_asset.is_some() && is_positive_amount(&self.amount)
    }

    /// Asset whose decimals scale `amount`: the output for buy orders, the input otherwise
    pub fn amount_asset(&self) -> Option<&Asset> {
        if self.is_buy_order {
            self.to_asset.as_ref()
        } else {
            self.from_asset.as_ref()
        }
    }

    /// Amount in base units of [`Self::amount_asset`]
    ///
    /// `Ok(None)` when the relevant asset has not been chosen yet.
    pub fn base_amount(&self) -> Result<Option<u128>, PrecisionError> {
        match self.amount_asset() {
            Some(asset) => parse_units(&self.amount, asset.decimals).map(Some),
            None => Ok(None),
        }
    }

    /// Translate into the provider's sell/buy request semantics.
    ///
    /// `None` unless both assets are present and the amount converts to a
    /// strictly positive number of base units.
    pub fn to_quote_request(&self, ranking_hint: RankingPolicy) -> Option<QuoteRequest> {
        let sell_asset = self.from_asset.clone()?;
        let buy_asset = self.to_asset.clone()?;
        let base = self.base_amount().ok().flatten().filter(|units| *units > 0)?;

        let amount = if self.is_buy_order {
            OrderAmount::Buy(base)
        } else {
            OrderAmount::Sell(base)
        };

        Some(QuoteRequest {
            sell_asset,
            buy_asset,
            amount,
            ranking_hint,
            recipient: self.recipient_override.clone(),
            slippage_tolerance: self.slippage_tolerance,
            speed_preference: self.speed_preference,
            account: if self.account.is_empty() {
                None
            } else {
                Some(self.account.clone())
            },
            network_id: self.network_id,
        })
    }
}

/// Assembles a [`RequestSnapshot`] from caller fields and wallet context.
///
/// Every setter is optional and `build` cannot fail.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    snapshot: RequestSnapshot,
}

impl SnapshotBuilder {
    pub fn from_asset(mut self, asset: Asset) -> Self {
        self.snapshot.from_asset = Some(asset);
        self
    }

    pub fn to_asset(mut self, asset: Asset) -> Self {
        self.snapshot.to_asset = Some(asset);
        self
    }

    pub fn maybe_from_asset(mut self, asset: Option<Asset>) -> Self {
        self.snapshot.from_asset = asset;
        self
    }

    pub fn maybe_to_asset(mut self, asset: Option<Asset>) -> Self {
        self.snapshot.to_asset = asset;
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.snapshot.amount = amount.into();
        self
    }

    pub fn buy_order(mut self, is_buy_order: bool) -> Self {
        self.snapshot.is_buy_order = is_buy_order;
        self
    }

    pub fn recipient_override(mut self, recipient: Option<String>) -> Self {
        self.snapshot.recipient_override = recipient;
        self
    }

    pub fn slippage_tolerance(mut self, slippage: Option<Decimal>) -> Self {
        self.snapshot.slippage_tolerance = slippage;
        self
    }

    pub fn speed_preference(mut self, speed: Option<SpeedPreference>) -> Self {
        self.snapshot.speed_preference = speed;
        self
    }

    /// Wallet context: active signer, or empty
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.snapshot.account = account.into();
        self
    }

    /// Wallet context: active network
    pub fn network_id(mut self, network_id: NetworkId) -> Self {
        self.snapshot.network_id = network_id;
        self
    }

    pub fn build(self) -> RequestSnapshot {
        self.snapshot
    }
}
