use thiserror::Error;

use crate::schema::common::{SigningErrorCode, SigningErrorInfo};

/// Reasons a transaction plan could not be produced.
///
/// Planning never returns a partial plan: any of these aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("No eligible unspent outputs: {0}")]
    NoEligibleOutputs(String),

    #[error("Change {change} is below the dust threshold {threshold}")]
    DustChange { change: u64, threshold: u64 },

    #[error("Zero amount requested")]
    ZeroAmountRequested,

    #[error("Invalid fee parameter: {0}")]
    InvalidFeeRate(String),

    #[error("Amount overflow while {0}")]
    AmountOverflow(String),

    #[error("Invalid unspent output #{index}: {reason}")]
    InvalidOutput { index: usize, reason: String },

    #[error("Change address is required for change {0}")]
    MissingChangeAddress(u64),

    #[error("OP_RETURN payload of {len} bytes exceeds {max}")]
    MemoTooLong { len: usize, max: usize },
}

impl PlanningError {
    #[must_use]
    pub const fn code(&self) -> SigningErrorCode {
        match self {
            Self::InsufficientFunds { .. } => SigningErrorCode::NotEnoughUtxos,
            Self::NoEligibleOutputs(_) => SigningErrorCode::MissingInputUtxos,
            Self::DustChange { .. } => SigningErrorCode::DustAmountRequested,
            Self::ZeroAmountRequested => SigningErrorCode::ZeroAmountRequested,
            Self::InvalidFeeRate(_)
            | Self::AmountOverflow(_)
            | Self::InvalidOutput { .. }
            | Self::MissingChangeAddress(_)
            | Self::MemoTooLong { .. } => SigningErrorCode::InvalidParams,
        }
    }

    #[must_use]
    pub fn to_error_info(&self) -> SigningErrorInfo {
        SigningErrorInfo::new(self.code(), self.to_string())
    }
}

/// Errors that occur during binary or hex encoding/decoding operations.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Failed to decode from binary: {0}")]
    BinaryDecode(#[from] prost::DecodeError),

    #[error("Failed to decode hex string: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Errors raised by variable-width big-endian amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is {len} bytes wide, at most {max} allowed")]
    TooWide { len: usize, max: usize },

    #[error("Amount does not fit in {0}")]
    Overflow(&'static str),

    #[error("Invalid amount field '{field}': {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<AmountError>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid chain parameters: {0}")]
    Invalid(String),

    #[error("Duplicate chain parameters for coin type {0}")]
    DuplicateCoin(u32),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_errors_map_to_wire_codes() {
        let cases = [
            (
                PlanningError::InsufficientFunds {
                    available: 1,
                    required: 2,
                },
                SigningErrorCode::NotEnoughUtxos,
            ),
            (
                PlanningError::NoEligibleOutputs("empty".to_string()),
                SigningErrorCode::MissingInputUtxos,
            ),
            (
                PlanningError::DustChange {
                    change: 3,
                    threshold: 546,
                },
                SigningErrorCode::DustAmountRequested,
            ),
            (
                PlanningError::ZeroAmountRequested,
                SigningErrorCode::ZeroAmountRequested,
            ),
            (
                PlanningError::AmountOverflow("summing inputs".to_string()),
                SigningErrorCode::InvalidParams,
            ),
        ];

        for (error, code) in cases {
            assert_eq!(error.code(), code, "{error}");
        }
    }

    #[test]
    fn error_info_carries_display_text() {
        let info = PlanningError::DustChange {
            change: 3,
            threshold: 546,
        }
        .to_error_info();

        assert_eq!(info.code(), SigningErrorCode::DustAmountRequested);
        assert!(info.description.contains("546"));
    }
}
