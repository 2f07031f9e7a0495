//! Precision Handling for Token Amounts
//!
//! Users type amounts in human units ("1.5" WETH) while quote providers work in
//! base units (1_500_000_000_000_000_000 wei). This module owns the conversion
//! between the two so that no floating point ever touches an amount.
//!
//! ## Precision Requirements by Asset Type
//!
//! - **WETH / DAI**: 18 decimal places (`1 WETH = 1_000_000_000_000_000_000 wei`)
//! - **USDC / USDT**: 6 decimal places (`1 USDC = 1_000_000 units`)
//! - **WBTC**: 8 decimal places
//!
//! ## Critical Rules
//!
//! 1. **NO FLOATING POINT**: amounts are `u128` base units or `Decimal` human units
//! 2. **Preserve Native Precision**: never round a user amount to fit a token,
//!    reject it instead ([`PrecisionError::TooManyDecimals`])
//! 3. **Explicit Conversions**: [`parse_units`] and [`format_units`] are the only
//!    crossing points
//!
//! ## Example Usage
//!
//! ```rust
//! use quote_types::precision::{format_units, parse_units};
//!
//! let wei = parse_units("1.5", 18).unwrap();
//! assert_eq!(wei, 1_500_000_000_000_000_000);
//! assert_eq!(format_units(wei, 18), "1.5");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest decimals value we accept; 10^38 is the last power of ten in u128.
pub const MAX_DECIMALS: u8 = 38;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrecisionError {
    #[error("Invalid amount: '{input}'")]
    InvalidAmount { input: String },

    #[error("Negative amount: '{input}'")]
    Negative { input: String },

    #[error("Amount '{input}' has {actual} fractional digits but token supports {decimals}")]
    TooManyDecimals {
        input: String,
        actual: usize,
        decimals: u8,
    },

    #[error("Value overflow: {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, PrecisionError>;

/// Convert a human-unit decimal string into base units.
///
/// Accepts an optional leading `+`, integer digits and an optional fractional
/// part (`"1"`, `"1.25"`, `".5"`, `"3."`). Surrounding whitespace is ignored.
pub fn parse_units(value: &str, decimals: u8) -> Result<u128> {
    let trimmed = value.trim();
    let invalid = || PrecisionError::InvalidAmount {
        input: value.to_string(),
    };

    if trimmed.starts_with('-') {
        return Err(PrecisionError::Negative {
            input: value.to_string(),
        });
    }
    if decimals > MAX_DECIMALS {
        return Err(PrecisionError::Overflow(format!(
            "{} decimals exceeds maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    // Trailing zeros carry no precision: "1.500000" is fine for a 2-decimal token
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(PrecisionError::TooManyDecimals {
            input: value.to_string(),
            actual: fraction.len(),
            decimals,
        });
    }

    let overflow = || PrecisionError::Overflow(format!("'{}' does not fit in u128 base units", value));
    let scale = 10u128.pow(decimals as u32);

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128.pow((decimals as usize - fraction.len()) as u32);
        fraction
            .parse::<u128>()
            .map_err(|_| invalid())?
            .checked_mul(padding)
            .ok_or_else(overflow)?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Whether `value` is a well-formed, strictly positive human-unit amount.
///
/// Same syntax as [`parse_units`]. Magnitude and token precision are not
/// checked, so amounts of any size are judged without overflow.
pub fn is_positive_amount(value: &str) -> bool {
    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }

    let digits = || whole.bytes().chain(fraction.bytes());
    digits().all(|b| b.is_ascii_digit()) && digits().any(|b| b != b'0')
}

/// Render base units as a human-unit string (display only, not calculations).
///
/// Trailing fractional zeros are trimmed but one fractional digit is kept.
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return format!("{}.0", amount);
    }
    let decimals = decimals.min(MAX_DECIMALS);
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let fractional = amount % scale;

    let digits = format!("{:0width$}", fractional, width = decimals as usize);
    let digits = digits.trim_end_matches('0');
    if digits.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, digits)
    }
}

/// Token amount with native precision preservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    /// Raw amount in smallest units (wei for ETH, etc.)
    #[serde(with = "base_units")]
    pub amount: u128,
    /// Number of decimal places for this token
    #[serde(default)]
    pub decimals: u8,
    /// Provider-formatted human amount, display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_units: Option<String>,
    /// USD valuation when the provider supplies one
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "amountInUSD")]
    pub amount_in_usd: Option<Decimal>,
}

impl TokenAmount {
    pub fn new(amount: u128, decimals: u8) -> Self {
        Self {
            amount,
            decimals,
            amount_in_units: None,
            amount_in_usd: None,
        }
    }

    /// Parse a human-unit string for a token with `decimals` places
    pub fn from_units(value: &str, decimals: u8) -> Result<Self> {
        Ok(Self::new(parse_units(value, decimals)?, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Convert to human readable string (for display only, not calculations)
    pub fn to_display_string(&self) -> String {
        self.amount_in_units
            .clone()
            .unwrap_or_else(|| format_units(self.amount, self.decimals))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Serde adapter for base-unit amounts.
///
/// Providers send big integers as decimal strings; plain JSON numbers are
/// accepted on input as well.
pub mod base_units {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct BaseUnitsVisitor;

        impl<'de> Visitor<'de> for BaseUnitsVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string of base units")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom(format!("negative base units: {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.trim()
                    .parse::<u128>()
                    .map_err(|_| E::custom(format!("invalid base units: '{}'", v)))
            }
        }

        deserializer.deserialize_any(BaseUnitsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_whole_and_fraction() {
        assert_eq!(parse_units("1", 6).unwrap(), 1_000_000);
        assert_eq!(parse_units("1.5", 18).unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_units(".25", 2).unwrap(), 25);
        assert_eq!(parse_units("3.", 2).unwrap(), 300);
        assert_eq!(parse_units(" +7 ", 0).unwrap(), 7);
    }

    #[test]
    fn test_parse_units_trailing_zeros_do_not_count() {
        assert_eq!(parse_units("1.500000", 2).unwrap(), 150);
    }

    #[test]
    fn test_parse_units_rejects_excess_precision() {
        let err = parse_units("0.0000001", 6).unwrap_err();
        assert_eq!(
            err,
            PrecisionError::TooManyDecimals {
                input: "0.0000001".to_string(),
                actual: 7,
                decimals: 6,
            }
        );
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(matches!(parse_units("", 6), Err(PrecisionError::InvalidAmount { .. })));
        assert!(matches!(parse_units(".", 6), Err(PrecisionError::InvalidAmount { .. })));
        assert!(matches!(parse_units("1.2.3", 6), Err(PrecisionError::InvalidAmount { .. })));
        assert!(matches!(parse_units("1e5", 6), Err(PrecisionError::InvalidAmount { .. })));
        assert!(matches!(parse_units("-1", 6), Err(PrecisionError::Negative { .. })));
    }

    #[test]
    fn test_parse_units_overflow() {
        let huge = "1".repeat(40);
        assert!(matches!(parse_units(&huge, 18), Err(PrecisionError::Overflow(_))));
        assert!(matches!(parse_units("1", 39), Err(PrecisionError::Overflow(_))));
    }

    #[test]
    fn test_is_positive_amount() {
        for positive in ["1", "+0.5", ".5", "3.", " 12.50 ", "0.0000001"] {
            assert!(is_positive_amount(positive), "{positive:?}");
        }
        for rejected in ["", " ", ".", "0", "0.00", "-3", "abc", "1e5", "1_000", "1.2.3", "+"] {
            assert!(!is_positive_amount(rejected), "{rejected:?}");
        }
    }

    #[test]
    fn test_is_positive_amount_has_no_magnitude_limit() {
        let huge = format!("1{}", "0".repeat(60));
        assert!(is_positive_amount(&huge));
        assert!(matches!(parse_units(&huge, 0), Err(PrecisionError::Overflow(_))));
    }

    #[test]
    fn test_zero_parses_to_zero() {
        assert_eq!(parse_units("0.000", 6).unwrap(), 0);
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(1_000_000_000_000_000_000, 18), "1.0");
        assert_eq!(format_units(10_000, 6), "0.01");
        assert_eq!(format_units(123_456_789, 6), "123.456789");
        assert_eq!(format_units(42, 0), "42.0");
    }

    #[test]
    fn test_token_amount_serde_uses_strings() {
        let amount = TokenAmount::new(2_500_000, 6);
        let json = serde_json::to_value(&amount).unwrap();
        assert_eq!(json["amount"], "2500000");

        let parsed: TokenAmount =
            serde_json::from_str(r#"{"amount": 12, "decimals": 6, "amountInUnits": "0.000012"}"#)
                .unwrap();
        assert_eq!(parsed.amount, 12);
        assert_eq!(parsed.to_display_string(), "0.000012");
    }
}
