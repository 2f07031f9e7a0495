//! Precision Property Tests
//!
//! Properties of human-unit / base-unit conversion that must hold for any
//! amount a user can type.

use proptest::prelude::*;
use quote_types::precision::{format_units, parse_units, PrecisionError};

proptest! {
    #[test]
    fn formatted_amounts_parse_back_exactly(amount in any::<u64>(), decimals in 0u8..=18) {
        let amount = amount as u128;
        let formatted = format_units(amount, decimals);
        prop_assert_eq!(parse_units(&formatted, decimals).unwrap(), amount);
    }

    #[test]
    fn whole_numbers_scale_by_decimals(whole in 0u64..1_000_000_000, decimals in 0u8..=18) {
        let parsed = parse_units(&whole.to_string(), decimals).unwrap();
        prop_assert_eq!(parsed, whole as u128 * 10u128.pow(decimals as u32));
    }

    #[test]
    fn extra_nonzero_digit_is_rejected(whole in 0u32..1000, decimals in 0u8..=12) {
        let input = format!("{}.{}1", whole, "0".repeat(decimals as usize));
        let rejected = matches!(
            parse_units(&input, decimals),
            Err(PrecisionError::TooManyDecimals { .. })
        );
        prop_assert!(rejected);
    }
}
