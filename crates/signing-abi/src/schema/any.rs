//! Coin-type routed envelope carrying opaque chain-specific payloads.

use std::fmt;

use crate::schema::common::{SigningErrorCode, SigningErrorInfo};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Operation {
    Sign = 0,
    /// Coin selection preview, no key material needed.
    Plan = 1,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
#[prost(skip_debug)]
pub struct AnySigningInput {
    #[prost(uint32, tag = "1")]
    pub coin_type: u32,
    #[prost(enumeration = "Operation", tag = "2")]
    pub operation: i32,
    /// Chain-specific request, encoded with that chain's schema.
    #[prost(bytes = "vec", tag = "3")]
    pub request: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub private_key: ::prost::alloc::vec::Vec<u8>,
}

impl fmt::Debug for AnySigningInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySigningInput")
            .field("coin_type", &self.coin_type)
            .field("operation", &self.operation)
            .field("request_len", &self.request.len())
            .field("private_key", &"[redacted]")
            .finish()
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AnySigningOutput {
    #[prost(oneof = "any_signing_output::Outcome", tags = "1, 2")]
    pub outcome: ::core::option::Option<any_signing_output::Outcome>,
}

pub mod any_signing_output {
    use crate::schema::common::SigningErrorInfo;

    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Error(SigningErrorInfo),
        /// Chain-specific response, encoded with that chain's schema.
        #[prost(bytes = "vec", tag = "2")]
        Output(::prost::alloc::vec::Vec<u8>),
    }
}

impl AnySigningOutput {
    #[must_use]
    pub fn success(output: Vec<u8>) -> Self {
        Self {
            outcome: Some(any_signing_output::Outcome::Output(output)),
        }
    }

    #[must_use]
    pub fn failure(code: SigningErrorCode, description: impl Into<String>) -> Self {
        Self::from_error(SigningErrorInfo::new(code, description))
    }

    #[must_use]
    pub fn from_error(error: SigningErrorInfo) -> Self {
        Self {
            outcome: Some(any_signing_output::Outcome::Error(error)),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Some(any_signing_output::Outcome::Output(_)))
    }

    /// Splits the union. A payload with neither branch set, as produced by a peer that
    /// dropped the field, reads as an internal error.
    pub fn into_result(self) -> Result<Vec<u8>, SigningErrorInfo> {
        match self.outcome {
            Some(any_signing_output::Outcome::Output(output)) => Ok(output),
            Some(any_signing_output::Outcome::Error(error)) => Err(error),
            None => Err(SigningErrorInfo::new(
                SigningErrorCode::Internal,
                "envelope carries neither output nor error",
            )),
        }
    }
}

message_names!("signing.any" => AnySigningInput, AnySigningOutput);
