use signing_abi::{CoinType, PlanningError, SigningErrorCode, SigningErrorInfo};
use thiserror::Error;

/// Failure reported by a chain signer. The envelope forwards it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct SignerFailure {
    pub code: SigningErrorCode,
    pub description: String,
}

impl SignerFailure {
    #[must_use]
    pub fn new(code: SigningErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

impl From<PlanningError> for SignerFailure {
    fn from(error: PlanningError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unsupported coin type: {0}")]
    UnsupportedCoin(CoinType),

    #[error("Invalid request encoding for {coin}: {source}")]
    InvalidRequestEncoding {
        coin: CoinType,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Invalid envelope encoding: {0}")]
    InvalidEnvelope(#[from] prost::DecodeError),

    #[error(transparent)]
    DelegateSignerFailure(#[from] SignerFailure),

    #[error("Operation {operation} is not supported for {coin}")]
    OperationNotSupported { coin: CoinType, operation: i32 },
}

impl DispatchError {
    #[must_use]
    pub const fn code(&self) -> SigningErrorCode {
        match self {
            Self::UnsupportedCoin(_) => SigningErrorCode::UnsupportedCoin,
            Self::InvalidRequestEncoding { .. } | Self::InvalidEnvelope(_) => {
                SigningErrorCode::INVALID_REQUEST
            }
            Self::DelegateSignerFailure(failure) => failure.code,
            Self::OperationNotSupported { .. } => SigningErrorCode::NotSupported,
        }
    }

    #[must_use]
    pub fn into_error_info(self) -> SigningErrorInfo {
        match self {
            Self::DelegateSignerFailure(failure) => {
                SigningErrorInfo::new(failure.code, failure.description)
            }
            other => SigningErrorInfo::new(other.code(), other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Coin type {0} is already registered")]
    DuplicateCoin(CoinType),

    #[error("A global signer registry is already installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_failure_is_forwarded_verbatim() {
        let error = DispatchError::from(SignerFailure::new(
            SigningErrorCode::Signing,
            "secp256k1: invalid scalar",
        ));

        let info = error.into_error_info();
        assert_eq!(info.code(), SigningErrorCode::Signing);
        assert_eq!(info.description, "secp256k1: invalid scalar");
    }

    #[test]
    fn planning_errors_keep_their_codes() {
        let failure = SignerFailure::from(PlanningError::InsufficientFunds {
            available: 10,
            required: 20,
        });

        assert_eq!(failure.code, SigningErrorCode::NotEnoughUtxos);
        assert!(failure.description.contains("available 10"));
    }

    #[test]
    fn envelope_errors_map_to_codes() {
        assert_eq!(
            DispatchError::UnsupportedCoin(CoinType::new(9999)).code(),
            SigningErrorCode::UnsupportedCoin
        );
        assert_eq!(
            DispatchError::OperationNotSupported {
                coin: CoinType::BITCOIN,
                operation: 7,
            }
            .code(),
            SigningErrorCode::NotSupported
        );
    }
}
