//! # Quote Types Library
//!
//! Shared value types for the quote refresh service.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: amounts are base-unit `u128` integers tied to the
//!   token's decimals; human input stays a string until [`precision::parse_units`]
//! - **Value Semantics**: every type derives `PartialEq`/`Eq` so request
//!   snapshots can be compared field by field
//! - **Provider Wire Format**: serde attributes match the aggregator JSON
//!   (camelCase, big integers as decimal strings)
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_types::{Asset, NetworkId, TokenAmount};
//!
//! let usdc = Asset::new("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "USDC", 6);
//! let amount = TokenAmount::from_units("12.5", usdc.decimals).unwrap();
//! assert_eq!(amount.amount, 12_500_000);
//! assert_eq!(NetworkId::POLYGON.chain_id(), 137);
//! ```

pub mod asset;
pub mod precision;
pub mod quote;

pub use asset::{Asset, NetworkId};
pub use precision::{format_units, is_positive_amount, parse_units, PrecisionError, TokenAmount};
pub use quote::{GasCost, QuoteCandidate, RouteSource, SpeedPreference};

pub use rust_decimal::Decimal;
