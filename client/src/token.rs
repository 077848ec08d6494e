//! Token identifiers.
use std::{fmt, str::FromStr};

use alloy::primitives::U256;

use crate::error::Error;

/// Identifier of a single token within one collection.
///
/// Identifiers are opaque to the client and compared by value. They parse from
/// decimal text (`"91"`) or `0x`-prefixed hexadecimal text (`"0x5b"`) and are
/// displayed in decimal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(U256);

impl TokenId {
    /// Wraps a raw 256-bit identifier.
    #[must_use]
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// The raw 256-bit value.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for TokenId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<TokenId> for U256 {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, radix) =
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => (hex, 16),
                None => (s, 10),
            };
        if digits.is_empty() {
            return Err(Error::Decode(format!("`{s}` is not a token id")));
        }
        U256::from_str_radix(digits, radix).map(Self).map_err(|e| {
            Error::Decode(format!("`{s}` is not a token id: {e}"))
        })
    }
}
