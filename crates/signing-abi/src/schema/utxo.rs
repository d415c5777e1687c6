//! Request, plan and response contracts for Bitcoin-derived UTXO chains.

use std::fmt;

use crate::hashing::sha256;

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct OutPoint {
    /// Previous transaction hash in internal byte order.
    #[prost(bytes = "vec", tag = "1")]
    pub hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub index: u32,
    #[prost(uint32, tag = "3")]
    pub sequence: u32,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnspentOutput {
    #[prost(message, optional, tag = "1")]
    pub out_point: ::core::option::Option<OutPoint>,
    /// Locking script of the output being spent.
    #[prost(bytes = "vec", tag = "2")]
    pub script: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub amount: u64,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
#[prost(skip_debug)]
pub struct SigningInput {
    #[prost(uint64, tag = "1")]
    pub amount: u64,
    #[prost(oneof = "signing_input::Fee", tags = "2, 3, 4")]
    pub fee: ::core::option::Option<signing_input::Fee>,
    #[prost(string, tag = "5")]
    pub to_address: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub change_address: ::prost::alloc::string::String,
    #[prost(bytes = "vec", repeated, tag = "7")]
    pub private_key: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, repeated, tag = "8")]
    pub utxo: ::prost::alloc::vec::Vec<UnspentOutput>,
    #[prost(bool, tag = "9")]
    pub use_max_amount: bool,
    /// Previously computed plan to sign verbatim instead of planning again.
    #[prost(message, optional, tag = "11")]
    pub plan: ::core::option::Option<TransactionPlan>,
    #[prost(uint32, tag = "12")]
    pub lock_time: u32,
    /// Payload of an extra zero-value OP_RETURN output; empty means none.
    #[prost(bytes = "vec", tag = "13")]
    pub output_op_return: ::prost::alloc::vec::Vec<u8>,
}

pub mod signing_input {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Fee {
        /// Whole base units per estimated byte.
        #[prost(uint64, tag = "2")]
        ByteFee(u64),
        /// Thousandths of a base unit per estimated byte.
        #[prost(uint64, tag = "3")]
        ByteFeeMilli(u64),
        #[prost(uint64, tag = "4")]
        FixedFee(u64),
    }
}

impl fmt::Debug for SigningInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningInput")
            .field("amount", &self.amount)
            .field("fee", &self.fee)
            .field("to_address", &self.to_address)
            .field("change_address", &self.change_address)
            .field("private_key", &format_args!("[{} redacted]", self.private_key.len()))
            .field("utxo", &self.utxo)
            .field("use_max_amount", &self.use_max_amount)
            .field("plan", &self.plan)
            .field("lock_time", &self.lock_time)
            .field("output_op_return", &hex::encode(&self.output_op_return))
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OutputRole {
    Recipient = 0,
    Change = 1,
    OpReturn = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SelectionStrategy {
    Unspecified = 0,
    UseMaxAmount = 1,
    ExactMatch = 2,
    SingleLargest = 3,
    LargestFirst = 4,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlannedOutput {
    #[prost(enumeration = "OutputRole", tag = "1")]
    pub role: i32,
    #[prost(string, tag = "2")]
    pub address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub amount: u64,
    /// Data carried by an `OpReturn` output.
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

/// Outcome of coin selection: which outputs to spend and where the value goes.
///
/// A valid plan satisfies `sum(utxos) == amount + fee + change`.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionPlan {
    #[prost(uint64, tag = "1")]
    pub amount: u64,
    #[prost(uint64, tag = "2")]
    pub available_amount: u64,
    #[prost(uint64, tag = "3")]
    pub fee: u64,
    #[prost(uint64, tag = "4")]
    pub change: u64,
    #[prost(message, repeated, tag = "5")]
    pub utxos: ::prost::alloc::vec::Vec<UnspentOutput>,
    #[prost(message, repeated, tag = "6")]
    pub outputs: ::prost::alloc::vec::Vec<PlannedOutput>,
    #[prost(enumeration = "SelectionStrategy", tag = "7")]
    pub strategy: i32,
}

impl TransactionPlan {
    /// SHA256 over the canonical encoding, ties a previewed plan to the signed one.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        sha256(&::prost::Message::encode_to_vec(self))
    }

    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint())
    }

    /// Sum of the selected outputs, `None` on overflow.
    #[must_use]
    pub fn selected_total(&self) -> Option<u64> {
        self.utxos
            .iter()
            .try_fold(0u64, |acc, utxo| acc.checked_add(utxo.amount))
    }

    #[must_use]
    pub fn change_output(&self) -> Option<&PlannedOutput> {
        self.outputs
            .iter()
            .find(|output| output.role() == OutputRole::Change)
    }

    #[must_use]
    pub fn op_return_output(&self) -> Option<&PlannedOutput> {
        self.outputs
            .iter()
            .find(|output| output.role() == OutputRole::OpReturn)
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SigningOutput {
    #[prost(bytes = "vec", tag = "1")]
    pub encoded: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub fee: u64,
    /// Realized amount, set when the whole balance was spent.
    #[prost(uint64, tag = "4")]
    pub max_amount: u64,
    #[prost(message, optional, tag = "5")]
    pub plan: ::core::option::Option<TransactionPlan>,
}

message_names!(
    "signing.utxo" =>
    OutPoint,
    UnspentOutput,
    SigningInput,
    PlannedOutput,
    TransactionPlan,
    SigningOutput,
);
