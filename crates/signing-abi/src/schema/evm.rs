//! Account-model (Ethereum-style) request/response contracts.
//!
//! Native quantities here exceed 64 bits, so value and gas fields travel as big-endian
//! byte strings and are validated through [`BeAmount`].

use std::fmt;

use crate::amount::BeAmount;
use crate::error::AmountError;

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(oneof = "transaction::Kind", tags = "1, 2, 3")]
    pub kind: ::core::option::Option<transaction::Kind>,
}

pub mod transaction {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Transfer {
        #[prost(bytes = "vec", tag = "1")]
        pub amount: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }

    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Erc20Transfer {
        #[prost(string, tag = "1")]
        pub to: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "2")]
        pub amount: ::prost::alloc::vec::Vec<u8>,
    }

    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ContractGeneric {
        #[prost(bytes = "vec", tag = "1")]
        pub amount: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }

    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Transfer(Transfer),
        #[prost(message, tag = "2")]
        Erc20Transfer(Erc20Transfer),
        #[prost(message, tag = "3")]
        ContractGeneric(ContractGeneric),
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
#[prost(skip_debug)]
pub struct SigningInput {
    #[prost(bytes = "vec", tag = "1")]
    pub chain_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub nonce: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub gas_price: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub gas_limit: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "5")]
    pub to_address: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "6")]
    pub private_key: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub transaction: ::core::option::Option<Transaction>,
}

impl fmt::Debug for SigningInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningInput")
            .field("chain_id", &hex::encode(&self.chain_id))
            .field("nonce", &hex::encode(&self.nonce))
            .field("gas_price", &hex::encode(&self.gas_price))
            .field("gas_limit", &hex::encode(&self.gas_limit))
            .field("to_address", &self.to_address)
            .field("private_key", &"[redacted]")
            .field("transaction", &self.transaction)
            .finish()
    }
}

/// Numeric fields of an account-model request after width validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountAmounts {
    pub chain_id: BeAmount,
    pub nonce: BeAmount,
    pub gas_price: BeAmount,
    pub gas_limit: BeAmount,
    pub value: BeAmount,
}

impl SigningInput {
    /// Validates every big-endian quantity in the request, including the value of
    /// whichever transaction kind is set.
    pub fn amounts(&self) -> Result<AccountAmounts, AmountError> {
        let value = match self.transaction.as_ref().and_then(|tx| tx.kind.as_ref()) {
            Some(transaction::Kind::Transfer(transfer)) => {
                BeAmount::parse_field("transfer.amount", &transfer.amount)?
            }
            Some(transaction::Kind::Erc20Transfer(transfer)) => {
                BeAmount::parse_field("erc20_transfer.amount", &transfer.amount)?
            }
            Some(transaction::Kind::ContractGeneric(call)) => {
                BeAmount::parse_field("contract_generic.amount", &call.amount)?
            }
            None => BeAmount::ZERO,
        };

        Ok(AccountAmounts {
            chain_id: BeAmount::parse_field("chain_id", &self.chain_id)?,
            nonce: BeAmount::parse_field("nonce", &self.nonce)?,
            gas_price: BeAmount::parse_field("gas_price", &self.gas_price)?,
            gas_limit: BeAmount::parse_field("gas_limit", &self.gas_limit)?,
            value,
        })
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SigningOutput {
    #[prost(bytes = "vec", tag = "1")]
    pub encoded: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub v: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub r: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub s: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

message_names!("signing.evm" => Transaction, SigningInput, SigningOutput);
