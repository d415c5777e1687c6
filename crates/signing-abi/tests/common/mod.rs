//! Shared helpers for planner integration tests.

#![allow(dead_code)]

use proptest::prelude::*;
use signing_abi::schema::utxo::signing_input::Fee;
use signing_abi::schema::utxo::{OutPoint, SigningInput, UnspentOutput};
use tracing_subscriber::EnvFilter;

/// Opt-in test logging, e.g. `RUST_LOG=signing_abi=trace`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Output with a distinct outpoint derived from `seed`.
pub fn utxo(seed: u8, amount: u64) -> UnspentOutput {
    UnspentOutput {
        out_point: Some(OutPoint {
            hash: vec![seed; 32],
            index: u32::from(seed),
            sequence: u32::MAX,
        }),
        script: vec![0x00, 0x14, seed],
        amount,
    }
}

pub fn request(amount: u64, fee: Fee, utxos: Vec<UnspentOutput>) -> SigningInput {
    SigningInput {
        amount,
        fee: Some(fee),
        to_address: "bc1qrecipient".to_string(),
        change_address: "bc1qchange".to_string(),
        utxo: utxos,
        ..Default::default()
    }
}

/// Between one and ten outputs with distinct outpoints.
pub fn utxo_set() -> impl Strategy<Value = Vec<UnspentOutput>> {
    prop::collection::vec(1u64..=5_000_000, 1..=10).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(position, amount)| {
                utxo(u8::try_from(position).expect("at most ten outputs"), amount)
            })
            .collect()
    })
}

/// Output set plus a target amount no larger than its total.
pub fn utxo_set_with_amount() -> impl Strategy<Value = (Vec<UnspentOutput>, u64)> {
    utxo_set().prop_flat_map(|utxos| {
        let total = utxos.iter().map(|utxo| utxo.amount).sum::<u64>();
        (Just(utxos), 1..=total)
    })
}

/// Byte fee between zero and twenty base units, in thousandths.
pub fn byte_fee_milli() -> impl Strategy<Value = u64> {
    0u64..=20_000
}
