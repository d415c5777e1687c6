//! Chain entry for Bitcoin-derived chains: plan, then hand off to a compiler.

use std::collections::HashMap;

use signing_abi::schema::utxo::{OutputRole, SigningInput, SigningOutput, TransactionPlan};
use signing_abi::{ChainParams, FeePolicy, SigningErrorCode, plan_transaction};
use tracing::instrument;

use crate::entry::ChainSigner;
use crate::error::SignerFailure;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledTransaction {
    pub encoded: Vec<u8>,
    pub transaction_id: String,
}

/// Builds and signs the raw transaction described by a plan.
///
/// Script construction, sighash computation and serialization live behind this trait.
pub trait TransactionCompiler: Send + Sync + 'static {
    fn compile(
        &self,
        input: &SigningInput,
        plan: &TransactionPlan,
        private_keys: &[&[u8]],
    ) -> Result<CompiledTransaction, SignerFailure>;
}

pub struct UtxoChainEntry<C> {
    params: ChainParams,
    compiler: C,
}

impl<C: TransactionCompiler> UtxoChainEntry<C> {
    #[must_use]
    pub const fn new(params: ChainParams, compiler: C) -> Self {
        Self { params, compiler }
    }

    #[must_use]
    pub const fn params(&self) -> &ChainParams {
        &self.params
    }
}

fn invalid_plan(reason: impl Into<String>) -> SignerFailure {
    SignerFailure::new(
        SigningErrorCode::InvalidParams,
        format!("supplied plan rejected: {}", reason.into()),
    )
}

impl<C> UtxoChainEntry<C> {
    /// A supplied plan is signed as is, so it must balance, spend only the request's
    /// outputs, pay at least the chain fee for its shape and describe its own outputs.
    fn check_supplied_plan(
        &self,
        input: &SigningInput,
        plan: &TransactionPlan,
    ) -> Result<(), SignerFailure> {
        let outputs_total = plan
            .amount
            .checked_add(plan.fee)
            .and_then(|sum| sum.checked_add(plan.change));
        match (plan.selected_total(), outputs_total) {
            (Some(inputs), Some(outputs)) if inputs == outputs && !plan.utxos.is_empty() => {}
            _ => {
                return Err(invalid_plan(
                    "selected outputs must equal amount + fee + change",
                ));
            }
        }

        let offered: HashMap<(&[u8], u32), u64> = input
            .utxo
            .iter()
            .filter_map(|utxo| {
                let out_point = utxo.out_point.as_ref()?;
                Some(((out_point.hash.as_slice(), out_point.index), utxo.amount))
            })
            .collect();
        for (position, utxo) in plan.utxos.iter().enumerate() {
            let known = utxo.out_point.as_ref().and_then(|out_point| {
                offered.get(&(out_point.hash.as_slice(), out_point.index))
            });
            if known != Some(&utxo.amount) {
                return Err(invalid_plan(format!(
                    "selected output #{position} is not among the request's unspent outputs"
                )));
            }
        }

        let recipients = plan
            .outputs
            .iter()
            .filter(|output| output.role() == OutputRole::Recipient)
            .collect::<Vec<_>>();
        if !matches!(recipients.as_slice(), [recipient] if recipient.amount == plan.amount) {
            return Err(invalid_plan(format!(
                "expected one recipient output of {}",
                plan.amount
            )));
        }
        let change = plan
            .outputs
            .iter()
            .filter(|output| output.role() == OutputRole::Change)
            .map(|output| output.amount)
            .collect::<Vec<_>>();
        let expected_change = if plan.change == 0 {
            Vec::new()
        } else {
            vec![plan.change]
        };
        if change != expected_change {
            return Err(invalid_plan(format!(
                "change outputs {change:?} do not match change {}",
                plan.change
            )));
        }
        if plan
            .outputs
            .iter()
            .any(|output| output.role() == OutputRole::OpReturn && output.amount != 0)
        {
            return Err(invalid_plan("OP_RETURN outputs must carry no value"));
        }

        let fee_policy = FeePolicy::from_request(input.fee.as_ref())?;
        let minimum_fee =
            fee_policy.fee(&self.params.fee_model, plan.utxos.len(), plan.outputs.len())?;
        if plan.fee < minimum_fee {
            return Err(invalid_plan(format!(
                "fee {} is below the minimum {minimum_fee} for {} inputs and {} outputs",
                plan.fee,
                plan.utxos.len(),
                plan.outputs.len()
            )));
        }

        Ok(())
    }
}

impl<C: TransactionCompiler> ChainSigner for UtxoChainEntry<C> {
    type Input = SigningInput;
    type Output = SigningOutput;
    type Plan = TransactionPlan;

    #[instrument(level = "debug", skip_all, err(level = "debug"), fields(chain = %self.params.name))]
    fn sign(
        &self,
        input: SigningInput,
        private_key: &[u8],
    ) -> Result<SigningOutput, SignerFailure> {
        let private_keys: Vec<&[u8]> = if private_key.is_empty() {
            input.private_key.iter().map(Vec::as_slice).collect()
        } else {
            vec![private_key]
        };
        if private_keys.iter().all(|key| key.is_empty()) {
            return Err(SignerFailure::new(
                SigningErrorCode::MissingPrivateKey,
                "no private key provided",
            ));
        }

        let plan = match &input.plan {
            Some(plan) => {
                self.check_supplied_plan(&input, plan)?;
                tracing::debug!(fingerprint = %plan.fingerprint_hex(), "signing supplied plan");
                plan.clone()
            }
            None => plan_transaction(&self.params, &input)?,
        };

        let compiled = self.compiler.compile(&input, &plan, &private_keys)?;
        tracing::debug!(
            transaction_id = %compiled.transaction_id,
            fee = plan.fee,
            "transaction signed"
        );

        Ok(SigningOutput {
            encoded: compiled.encoded,
            transaction_id: compiled.transaction_id,
            fee: plan.fee,
            max_amount: if input.use_max_amount { plan.amount } else { 0 },
            plan: Some(plan),
        })
    }

    fn plan(&self, input: SigningInput) -> Result<TransactionPlan, SignerFailure> {
        Ok(plan_transaction(&self.params, &input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signing_abi::schema::utxo::signing_input::Fee;
    use signing_abi::schema::utxo::{OutPoint, UnspentOutput};

    /// Records the key count in the encoding so tests can see which keys were used.
    struct CountingCompiler;

    impl TransactionCompiler for CountingCompiler {
        fn compile(
            &self,
            _input: &SigningInput,
            plan: &TransactionPlan,
            private_keys: &[&[u8]],
        ) -> Result<CompiledTransaction, SignerFailure> {
            let mut encoded = vec![u8::try_from(private_keys.len()).unwrap_or(u8::MAX)];
            encoded.extend(plan.fingerprint());
            Ok(CompiledTransaction {
                transaction_id: signing_abi::hashing::display_txid(&encoded),
                encoded,
            })
        }
    }

    fn utxo(seed: u8, amount: u64) -> UnspentOutput {
        UnspentOutput {
            out_point: Some(OutPoint {
                hash: vec![seed; 32],
                index: 0,
                sequence: u32::MAX,
            }),
            script: Vec::new(),
            amount,
        }
    }

    fn input() -> SigningInput {
        SigningInput {
            amount: 5_000,
            fee: Some(Fee::ByteFee(1)),
            to_address: "bc1qrecipient".to_string(),
            change_address: "bc1qchange".to_string(),
            private_key: vec![vec![0x11; 32], vec![0x22; 32]],
            utxo: vec![utxo(1, 6_000), utxo(2, 4_000)],
            ..Default::default()
        }
    }

    fn entry() -> UtxoChainEntry<CountingCompiler> {
        UtxoChainEntry::new(ChainParams::bitcoin(), CountingCompiler)
    }

    #[test]
    fn envelope_key_takes_precedence() {
        let output = entry().sign(input(), &[0x33; 32]).expect("signs");
        assert_eq!(output.encoded[0], 1);

        let output = entry().sign(input(), &[]).expect("signs");
        assert_eq!(output.encoded[0], 2);
        assert_eq!(output.fee, 174);
        assert_eq!(output.max_amount, 0);
    }

    #[test]
    fn missing_keys_are_reported() {
        let mut input = input();
        input.private_key.clear();

        let err = entry().sign(input, &[]).expect_err("no key");
        assert_eq!(err.code, SigningErrorCode::MissingPrivateKey);
    }

    #[test]
    fn unbalanced_supplied_plan_is_rejected() {
        let mut input = input();
        let mut plan = entry().plan(input.clone()).expect("plans");
        plan.fee += 1;
        input.plan = Some(plan);

        let err = entry().sign(input, &[]).expect_err("does not balance");
        assert_eq!(err.code, SigningErrorCode::InvalidParams);
    }

    #[test]
    fn planning_failures_carry_planner_codes() {
        let mut input = input();
        input.amount = 50_000;

        let err = entry().sign(input, &[]).expect_err("not enough funds");
        assert_eq!(err.code, SigningErrorCode::NotEnoughUtxos);
    }
}
