//! Test chains shared by dispatch integration tests.

#![allow(dead_code)]

use prost::Message;
use signing_abi::hashing::{display_txid, sha256};
use signing_abi::schema::evm;
use signing_abi::schema::utxo::{OutPoint, SigningInput, TransactionPlan, UnspentOutput};
use signing_abi::schema::utxo::signing_input::Fee;
use signing_abi::{ChainParams, CoinType, SigningErrorCode};
use signing_dispatch::{
    ChainSigner, CompiledTransaction, SignerFailure, SignerRegistry, TransactionCompiler,
    UtxoChainEntry,
};
use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Serializes the plan instead of a real transaction; the id is its double SHA256.
pub struct PlanEchoCompiler;

impl TransactionCompiler for PlanEchoCompiler {
    fn compile(
        &self,
        input: &SigningInput,
        plan: &TransactionPlan,
        private_keys: &[&[u8]],
    ) -> Result<CompiledTransaction, SignerFailure> {
        if input.to_address.is_empty() {
            return Err(SignerFailure::new(
                SigningErrorCode::InvalidParams,
                "recipient address is empty",
            ));
        }
        if private_keys.iter().any(|key| key.len() != 32) {
            return Err(SignerFailure::new(
                SigningErrorCode::Signing,
                "private keys must be 32 bytes",
            ));
        }

        let mut encoded = plan.encode_to_vec();
        encoded.extend(input.lock_time.to_le_bytes());
        Ok(CompiledTransaction {
            transaction_id: display_txid(&encoded),
            encoded,
        })
    }
}

/// Account-model signer producing a digest of the validated request.
pub struct DigestEvmSigner;

impl ChainSigner for DigestEvmSigner {
    type Input = evm::SigningInput;
    type Output = evm::SigningOutput;
    type Plan = ();

    fn sign(
        &self,
        input: evm::SigningInput,
        private_key: &[u8],
    ) -> Result<evm::SigningOutput, SignerFailure> {
        let amounts = input.amounts().map_err(|error| {
            SignerFailure::new(SigningErrorCode::InvalidParams, error.to_string())
        })?;
        let key = if private_key.is_empty() {
            input.private_key.as_slice()
        } else {
            private_key
        };
        if key.is_empty() {
            return Err(SignerFailure::new(
                SigningErrorCode::MissingPrivateKey,
                "no private key provided",
            ));
        }

        let mut preimage = amounts.value.into_be_bytes();
        preimage.extend(input.to_address.as_bytes());
        let digest = sha256(&preimage);

        Ok(evm::SigningOutput {
            encoded: digest.to_vec(),
            v: vec![0x25],
            r: digest[..16].to_vec(),
            s: digest[16..].to_vec(),
            data: Vec::new(),
        })
    }
}

pub fn registry() -> SignerRegistry {
    SignerRegistry::builder()
        .register(
            CoinType::BITCOIN,
            UtxoChainEntry::new(ChainParams::bitcoin(), PlanEchoCompiler),
        )
        .and_then(|builder| {
            builder.register(
                CoinType::DOGECOIN,
                UtxoChainEntry::new(ChainParams::dogecoin(), PlanEchoCompiler),
            )
        })
        .and_then(|builder| builder.register(CoinType::ETHEREUM, DigestEvmSigner))
        .expect("distinct coin types")
        .build()
}

pub fn utxo(seed: u8, amount: u64) -> UnspentOutput {
    UnspentOutput {
        out_point: Some(OutPoint {
            hash: vec![seed; 32],
            index: u32::from(seed),
            sequence: u32::MAX,
        }),
        script: vec![0x00, 0x14],
        amount,
    }
}

pub fn bitcoin_request() -> SigningInput {
    SigningInput {
        amount: 5_000,
        fee: Some(Fee::ByteFee(1)),
        to_address: "bc1qrecipient".to_string(),
        change_address: "bc1qchange".to_string(),
        private_key: vec![vec![0x11; 32]],
        utxo: vec![utxo(1, 6_000), utxo(2, 4_000), utxo(3, 2_000)],
        ..Default::default()
    }
}
