/// Error codes shared by every chain signer and the dispatch envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SigningErrorCode {
    Ok = 0,
    General = 1,
    Internal = 2,
    LowBalance = 3,
    ZeroAmountRequested = 4,
    MissingPrivateKey = 5,
    WrongFee = 6,
    Signing = 7,
    MissingInputUtxos = 9,
    NotEnoughUtxos = 10,
    InputParse = 19,
    InvalidParams = 22,
    NotSupported = 24,
    DustAmountRequested = 25,
    UnsupportedCoin = 100,
}

impl SigningErrorCode {
    /// Malformed request payloads are reported as parse failures.
    pub const INVALID_REQUEST: Self = Self::InputParse;
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SigningErrorInfo {
    #[prost(enumeration = "SigningErrorCode", tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub description: ::prost::alloc::string::String,
}

impl SigningErrorInfo {
    #[must_use]
    pub fn new(code: SigningErrorCode, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

message_names!("signing.common" => SigningErrorInfo);
