// SPDX-License-Identifier: Apache-2.0

//! Token identity and decimal precision types.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// ERC-20 token decimal precision
///
/// Most ERC-20 tokens use 18 decimals (like ETH), but some use different
/// values: USDC uses 6, WBTC uses 8. Tokens that fail the `decimals()` call
/// (non-standard or non-existent contracts) fall back to
/// [`TokenDecimals::FALLBACK`].
///
/// # Examples
///
/// ```
/// use allowscan::TokenDecimals;
///
/// let usdc = TokenDecimals::new(6);
/// assert_eq!(usdc.as_u8(), 6);
/// assert_eq!(TokenDecimals::FALLBACK.as_u8(), 18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDecimals(u8);

impl TokenDecimals {
    /// Default applied when a token's `decimals()` call fails (18, the
    /// overwhelmingly common value).
    pub const FALLBACK: Self = Self(18);

    /// Create a new decimal precision value
    pub const fn new(decimals: u8) -> Self {
        Self(decimals)
    }

    /// Get the inner u8 value
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl From<u8> for TokenDecimals {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TokenDecimals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} decimals", self.0)
    }
}

/// Resolved identity of an ERC-20 token contract
///
/// Immutable once resolved. The `symbol` and `decimals` fields carry the
/// fallback sentinels (`"UNKNOWN"`, 18) when the respective contract call
/// failed; each field falls back independently, so a token missing
/// `decimals()` can still report its real symbol and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token contract address
    pub address: Address,
    /// Token symbol, or `"UNKNOWN"` if the `symbol()` call failed
    pub symbol: String,
    /// Token decimals, or 18 if the `decimals()` call failed
    pub decimals: TokenDecimals,
}

impl TokenInfo {
    /// Sentinel symbol used when `symbol()` cannot be read.
    pub const UNKNOWN_SYMBOL: &'static str = "UNKNOWN";

    /// Construct token info from resolved metadata
    pub fn new(address: Address, symbol: impl Into<String>, decimals: impl Into<TokenDecimals>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals: decimals.into(),
        }
    }

    /// Construct the full-fallback identity for a token whose metadata
    /// could not be read at all.
    pub fn unknown(address: Address) -> Self {
        Self {
            address,
            symbol: Self::UNKNOWN_SYMBOL.to_string(),
            decimals: TokenDecimals::FALLBACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_sentinels() {
        let info = TokenInfo::unknown(Address::ZERO);
        assert_eq!(info.symbol, "UNKNOWN");
        assert_eq!(info.decimals.as_u8(), 18);
    }

    #[test]
    fn test_decimals_conversions() {
        let decimals: TokenDecimals = 6u8.into();
        assert_eq!(decimals.as_u8(), 6);
        assert_eq!(format!("{}", decimals), "6 decimals");
    }

    #[test]
    fn test_serde_round_trip() {
        let info = TokenInfo::new(Address::ZERO, "DAI", 18u8);
        let json = serde_json::to_string(&info).unwrap();
        let back: TokenInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
