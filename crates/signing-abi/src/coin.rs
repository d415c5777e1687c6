use std::fmt;

use serde::{Deserialize, Serialize};

/// Chain identifier following the SLIP-44 registered coin type numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(u32);

impl CoinType {
    pub const BITCOIN: Self = Self(0);
    pub const LITECOIN: Self = Self(2);
    pub const DOGECOIN: Self = Self(3);
    pub const ETHEREUM: Self = Self(60);
    pub const BITCOIN_CASH: Self = Self(145);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn known_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("bitcoin"),
            2 => Some("litecoin"),
            3 => Some("dogecoin"),
            60 => Some("ethereum"),
            145 => Some("bitcoincash"),
            _ => None,
        }
    }
}

impl From<u32> for CoinType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CoinType> for u32 {
    fn from(value: CoinType) -> Self {
        value.0
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known_name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "coin type {}", self.0),
        }
    }
}
