//! Coin-type routed dispatch of opaque requests.
//!
//! Every call yields an [`AnySigningOutput`] with exactly one branch set: the encoded
//! chain response or a [`SigningErrorInfo`](signing_abi::SigningErrorInfo).

use prost::Message;
use signing_abi::schema::any::{AnySigningInput, AnySigningOutput, Operation};
use signing_abi::{CoinType, SigningErrorCode};
use tracing::instrument;

use crate::error::DispatchError;
use crate::registry::{SignerRegistry, global};

impl SignerRegistry {
    #[instrument(
        level = "debug",
        skip_all,
        fields(coin_type = input.coin_type, operation = input.operation)
    )]
    pub fn dispatch(&self, input: &AnySigningInput) -> AnySigningOutput {
        into_output(self.try_dispatch(input))
    }

    /// Routes `input` and returns the encoded chain response.
    pub fn try_dispatch(&self, input: &AnySigningInput) -> Result<Vec<u8>, DispatchError> {
        let coin = CoinType::new(input.coin_type);
        let entry = self
            .entry(coin)
            .ok_or(DispatchError::UnsupportedCoin(coin))?;

        match Operation::try_from(input.operation) {
            Ok(Operation::Sign) => entry.sign(coin, &input.request, &input.private_key),
            Ok(Operation::Plan) => entry.plan(coin, &input.request),
            Err(_) => Err(DispatchError::OperationNotSupported {
                coin,
                operation: input.operation,
            }),
        }
    }

    /// Decodes an [`AnySigningInput`], dispatches it and encodes the outcome.
    #[must_use]
    pub fn dispatch_bytes(&self, input: &[u8]) -> Vec<u8> {
        let output = match AnySigningInput::decode(input) {
            Ok(input) => self.dispatch(&input),
            Err(error) => into_output(Err(DispatchError::InvalidEnvelope(error))),
        };

        output.encode_to_vec()
    }

    #[must_use]
    pub fn sign(
        &self,
        coin_type: CoinType,
        request: &[u8],
        private_key: &[u8],
    ) -> AnySigningOutput {
        self.dispatch(&AnySigningInput {
            coin_type: coin_type.value(),
            operation: Operation::Sign.into(),
            request: request.to_vec(),
            private_key: private_key.to_vec(),
        })
    }

    #[must_use]
    pub fn plan(&self, coin_type: CoinType, request: &[u8]) -> AnySigningOutput {
        self.dispatch(&AnySigningInput {
            coin_type: coin_type.value(),
            operation: Operation::Plan.into(),
            request: request.to_vec(),
            private_key: Vec::new(),
        })
    }
}

/// Dispatches through the installed global registry. Without one, every coin type is
/// unsupported.
#[must_use]
pub fn dispatch_global(input: &AnySigningInput) -> AnySigningOutput {
    match global() {
        Some(registry) => registry.dispatch(input),
        None => AnySigningOutput::failure(
            SigningErrorCode::UnsupportedCoin,
            DispatchError::UnsupportedCoin(CoinType::new(input.coin_type)).to_string(),
        ),
    }
}

fn into_output(result: Result<Vec<u8>, DispatchError>) -> AnySigningOutput {
    match result {
        Ok(output) => AnySigningOutput::success(output),
        Err(error) => {
            tracing::debug!(code = ?error.code(), "dispatch failed: {error}");
            AnySigningOutput::from_error(error.into_error_info())
        }
    }
}
