// SPDX-License-Identifier: Apache-2.0

//! Allowance amount formatting
//!
//! Allowances are 256-bit unsigned integers in token base units, far beyond
//! what `f64` can represent faithfully, so all arithmetic here goes through
//! [`BigDecimal`]. Three renderings exist:
//!
//! - `2^256 - 1` is the conventional "approve everything" value and is
//!   labeled `Unlimited <symbol>` instead of a 78-digit number;
//! - values above 1,000,000 (after applying token decimals) render in
//!   scientific notation with two decimal digits, e.g. `2.50e+6`;
//! - everything else renders fixed with two decimal digits, e.g. `42.50`.

use alloy_primitives::U256;
use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode};

use crate::types::TokenDecimals;

/// Threshold above which values switch to scientific notation.
const SHORTEN_THRESHOLD: u64 = 1_000_000;

/// Decimal digits shown in both fixed and scientific renderings.
const DISPLAY_DECIMALS: u64 = 2;

/// True when the raw allowance is the 2^256−1 "unlimited" sentinel.
pub fn is_unlimited(raw: U256) -> bool {
    raw == U256::MAX
}

/// Convert a raw base-unit amount into a human-unit decimal value.
///
/// # Examples
///
/// ```
/// use allowscan::{base_unit_value, TokenDecimals};
/// use alloy_primitives::U256;
///
/// let value = base_unit_value(U256::from(1_500_000u64), TokenDecimals::new(6));
/// assert_eq!(value.to_string(), "1.500000");
/// ```
pub fn base_unit_value(raw: U256, decimals: TokenDecimals) -> BigDecimal {
    // U256 always yields a valid base-10 string, so the parse cannot fail.
    let digits = BigInt::parse_bytes(raw.to_string().as_bytes(), 10).unwrap_or_default();
    BigDecimal::new(digits, i64::from(decimals.as_u8()))
}

/// Render an allowance for display.
///
/// Returns `Unlimited <symbol>` for the 2^256−1 sentinel, scientific
/// notation above 1,000,000 human units, fixed two-decimal notation
/// otherwise.
///
/// # Examples
///
/// ```
/// use allowscan::{format_allowance, TokenDecimals};
/// use alloy_primitives::U256;
///
/// let decimals = TokenDecimals::new(18);
/// assert_eq!(format_allowance(U256::MAX, decimals, "DAI"), "Unlimited DAI");
/// ```
pub fn format_allowance(raw: U256, decimals: TokenDecimals, symbol: &str) -> String {
    if is_unlimited(raw) {
        return format!("Unlimited {symbol}");
    }
    shorten_number(&base_unit_value(raw, decimals))
}

/// Compact rendering of a human-unit value: scientific above the
/// threshold, fixed two decimals otherwise.
pub fn shorten_number(value: &BigDecimal) -> String {
    if *value > BigDecimal::from(SHORTEN_THRESHOLD) {
        to_exponential(value, DISPLAY_DECIMALS)
    } else {
        value
            .with_scale_round(DISPLAY_DECIMALS as i64, RoundingMode::HalfUp)
            .to_string()
    }
}

/// Scientific notation with a fixed number of decimal digits, matching the
/// `1.23e+6` shape.
fn to_exponential(value: &BigDecimal, precision: u64) -> String {
    if value.sign() == bigdecimal::num_bigint::Sign::NoSign {
        return format!("0.{}e+0", "0".repeat(precision as usize));
    }

    // Round to (precision + 1) significant digits first; with_prec carries
    // into a new leading digit when rounding overflows (9.99... -> 1.00eN+1).
    let rounded = value.with_prec(precision + 1);
    let (digits, scale) = rounded.as_bigint_and_exponent();
    let digit_str = digits.magnitude().to_string();

    let exponent = digit_str.len() as i64 - 1 - scale;
    let mantissa_tail: String = digit_str[1..]
        .chars()
        .chain(std::iter::repeat('0'))
        .take(precision as usize)
        .collect();

    let sign = if exponent < 0 { "-" } else { "+" };
    format!(
        "{}.{}e{}{}",
        &digit_str[..1],
        mantissa_tail,
        sign,
        exponent.abs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole_tokens(amount: u64, decimals: u8) -> U256 {
        U256::from(amount) * U256::from(10u64).pow(U256::from(decimals))
    }

    #[test]
    fn test_unlimited_sentinel() {
        assert!(is_unlimited(U256::MAX));
        assert!(!is_unlimited(U256::MAX - U256::from(1u64)));
        assert_eq!(
            format_allowance(U256::MAX, TokenDecimals::new(18), "USDT"),
            "Unlimited USDT"
        );
    }

    #[test]
    fn test_large_value_scientific() {
        let raw = whole_tokens(2_500_000, 18);
        assert_eq!(
            format_allowance(raw, TokenDecimals::new(18), "DAI"),
            "2.50e+6"
        );
    }

    #[test]
    fn test_small_value_fixed() {
        // 42.5 tokens with 6 decimals
        let raw = U256::from(42_500_000u64);
        assert_eq!(
            format_allowance(raw, TokenDecimals::new(6), "USDC"),
            "42.50"
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let raw = whole_tokens(1_000_000, 18);
        assert_eq!(
            format_allowance(raw, TokenDecimals::new(18), "DAI"),
            "1000000.00"
        );
    }

    #[test]
    fn test_scientific_rounding() {
        assert_eq!(
            shorten_number(&BigDecimal::from(1_234_567u64)),
            "1.23e+6"
        );
        // Rounding carries into the next magnitude
        assert_eq!(
            shorten_number(&BigDecimal::from(9_999_999u64)),
            "1.00e+7"
        );
    }

    #[test]
    fn test_fixed_rounding() {
        let value: BigDecimal = "123.456".parse().unwrap();
        assert_eq!(shorten_number(&value), "123.46");
    }

    #[test]
    fn test_zero() {
        assert_eq!(
            format_allowance(U256::ZERO, TokenDecimals::new(18), "DAI"),
            "0.00"
        );
    }

    #[test]
    fn test_base_unit_value_applies_decimals() {
        let value = base_unit_value(U256::from(1u64), TokenDecimals::new(18));
        assert_eq!(value.to_string(), "0.000000000000000001");
    }
}
