//! Variable-width unsigned amounts encoded as big-endian bytes.
//!
//! Chains whose native quantities exceed 64 bits carry them as byte strings on the
//! wire. [`BeAmount`] keeps those values exact: it only strips redundant leading zero
//! bytes and never truncates.

use std::cmp::Ordering;
use std::fmt;

use crate::error::AmountError;

/// Widest accepted amount, enough for a 256-bit integer.
pub const MAX_AMOUNT_BYTES: usize = 32;

/// Normalized big-endian unsigned integer. Zero is the empty byte string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BeAmount(Vec<u8>);

impl BeAmount {
    pub const ZERO: Self = Self(Vec::new());

    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, AmountError> {
        let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let significant = &bytes[first_nonzero..];

        if significant.len() > MAX_AMOUNT_BYTES {
            return Err(AmountError::TooWide {
                len: significant.len(),
                max: MAX_AMOUNT_BYTES,
            });
        }

        Ok(Self(significant.to_vec()))
    }

    /// Validates a named wire field.
    pub fn parse_field(field: &'static str, bytes: &[u8]) -> Result<Self, AmountError> {
        Self::from_be_bytes(bytes).map_err(|source| AmountError::Field {
            field,
            source: Box::new(source),
        })
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }

    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        let bytes = value.to_be_bytes();
        let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self(bytes[first_nonzero..].to_vec())
    }

    #[must_use]
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_be_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_u64(&self) -> Result<u64, AmountError> {
        let value = self.to_u128().map_err(|_| AmountError::Overflow("u64"))?;
        u64::try_from(value).map_err(|_| AmountError::Overflow("u64"))
    }

    pub fn to_u128(&self) -> Result<u128, AmountError> {
        if self.0.len() > 16 {
            return Err(AmountError::Overflow("u128"));
        }

        Ok(self
            .0
            .iter()
            .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte)))
    }
}

impl Ord for BeAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for BeAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0x0");
        }
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<u64> for BeAmount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}
