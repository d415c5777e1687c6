//! Typed chain signers and their type-erased registry entries.

use prost::{Message, Name};
use signing_abi::{CoinType, SigningErrorCode};

use crate::error::{DispatchError, SignerFailure};

/// One chain's signing implementation over its own request and response schemas.
///
/// Decoding and encoding are derived from the message types, so an implementation
/// only deals with typed values.
pub trait ChainSigner: Send + Sync + 'static {
    type Input: Message + Name + Default;
    type Output: Message + Name + Default;
    /// Preview returned by [`ChainSigner::plan`]. Chains without planning use `()`.
    type Plan: Message + Default;

    fn sign(&self, input: Self::Input, private_key: &[u8]) -> Result<Self::Output, SignerFailure>;

    fn plan(&self, input: Self::Input) -> Result<Self::Plan, SignerFailure> {
        let _ = input;
        Err(SignerFailure::new(
            SigningErrorCode::NotSupported,
            format!("{} does not support planning", <Self::Input as Name>::full_name()),
        ))
    }
}

/// Message names a registered chain speaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaInfo {
    pub request_type_url: String,
    pub response_type_url: String,
}

pub(crate) trait ErasedEntry: Send + Sync {
    fn sign(
        &self,
        coin: CoinType,
        request: &[u8],
        private_key: &[u8],
    ) -> Result<Vec<u8>, DispatchError>;

    fn plan(&self, coin: CoinType, request: &[u8]) -> Result<Vec<u8>, DispatchError>;

    fn schema(&self) -> SchemaInfo;
}

pub(crate) struct Typed<S>(pub S);

impl<S: ChainSigner> Typed<S> {
    fn decode(coin: CoinType, request: &[u8]) -> Result<S::Input, DispatchError> {
        <S::Input as Message>::decode(request)
            .map_err(|source| DispatchError::InvalidRequestEncoding { coin, source })
    }
}

impl<S: ChainSigner> ErasedEntry for Typed<S> {
    fn sign(
        &self,
        coin: CoinType,
        request: &[u8],
        private_key: &[u8],
    ) -> Result<Vec<u8>, DispatchError> {
        let input = Self::decode(coin, request)?;
        let output = self.0.sign(input, private_key)?;

        Ok(output.encode_to_vec())
    }

    fn plan(&self, coin: CoinType, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let input = Self::decode(coin, request)?;
        let plan = self.0.plan(input)?;

        Ok(plan.encode_to_vec())
    }

    fn schema(&self) -> SchemaInfo {
        SchemaInfo {
            request_type_url: <S::Input as Name>::type_url(),
            response_type_url: <S::Output as Name>::type_url(),
        }
    }
}
