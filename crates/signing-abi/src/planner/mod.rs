//! Coin selection and fee planning for UTXO chains.
//!
//! [`Planner::plan`] turns a [`SigningInput`] into a [`TransactionPlan`] or a
//! [`PlanningError`]. Planning is pure and deterministic: the same request always
//! yields the same plan, whatever order the outputs were supplied in.

pub mod fee;
pub mod params;
mod selection;

use std::collections::HashSet;

use tracing::instrument;

use crate::error::PlanningError;
use crate::planner::fee::{FeeEstimator, FeePolicy};
use crate::planner::params::{ChainParams, DustPolicy};
use crate::planner::selection::{Candidate, Selection, SelectionContext};
use crate::schema::result::{BatchResult, TypedObject};
use crate::schema::utxo::{
    OutputRole, PlannedOutput, SelectionStrategy, SigningInput, TransactionPlan, UnspentOutput,
};

/// Largest OP_RETURN payload relayed as standard.
pub const MAX_OP_RETURN_BYTES: usize = 80;

/// Plans with the estimator and dust rules of one chain.
#[derive(Clone, Copy)]
pub struct Planner<'a> {
    estimator: &'a dyn FeeEstimator,
    dust_policy: DustPolicy,
    min_change: u64,
}

/// Plans `input` with the rules of `params`.
pub fn plan_transaction(
    params: &ChainParams,
    input: &SigningInput,
) -> Result<TransactionPlan, PlanningError> {
    Planner::for_chain(params).plan(input)
}

impl<'a> Planner<'a> {
    #[must_use]
    pub const fn new(
        estimator: &'a dyn FeeEstimator,
        dust_policy: DustPolicy,
        min_change: u64,
    ) -> Self {
        Self {
            estimator,
            dust_policy,
            min_change,
        }
    }

    #[must_use]
    pub fn for_chain(params: &'a ChainParams) -> Self {
        Self::new(&params.fee_model, params.dust_policy, params.min_change)
    }

    /// Smallest change output worth creating under `fee_policy`.
    pub fn dust_threshold(&self, fee_policy: FeePolicy) -> Result<u64, PlanningError> {
        match fee_policy {
            FeePolicy::Rate(_) => Ok(self
                .min_change
                .max(fee_policy.input_cost(self.estimator)?)),
            FeePolicy::Fixed(_) => Ok(self.min_change),
        }
    }

    #[instrument(
        level = "debug",
        skip_all,
        err(level = "debug"),
        fields(utxos = input.utxo.len(), use_max_amount = input.use_max_amount)
    )]
    pub fn plan(&self, input: &SigningInput) -> Result<TransactionPlan, PlanningError> {
        if input.utxo.is_empty() {
            return Err(PlanningError::NoEligibleOutputs(
                "no unspent outputs were provided".to_string(),
            ));
        }
        if input.amount == 0 && !input.use_max_amount {
            return Err(PlanningError::ZeroAmountRequested);
        }

        let fee_policy = FeePolicy::from_request(input.fee.as_ref())?;
        let extra_outputs = memo_outputs(input)?;
        let candidates = collect_candidates(&input.utxo)?;
        let available = candidates
            .iter()
            .try_fold(0u64, |sum, candidate| sum.checked_add(candidate.amount))
            .ok_or_else(|| PlanningError::AmountOverflow("summing available outputs".to_string()))?;

        if input.use_max_amount {
            return self.plan_max_amount(
                input,
                fee_policy,
                extra_outputs,
                &candidates,
                available,
            );
        }

        if available < input.amount {
            return Err(PlanningError::InsufficientFunds {
                available,
                required: input.amount,
            });
        }

        let input_cost = fee_policy.input_cost(self.estimator)?;
        let eligible = candidates
            .into_iter()
            .filter(|candidate| candidate.amount > input_cost)
            .collect::<Vec<_>>();
        if eligible.is_empty() {
            return Err(PlanningError::NoEligibleOutputs(format!(
                "all {} outputs are worth at most the {input_cost} needed to spend them",
                input.utxo.len()
            )));
        }

        let ctx = SelectionContext {
            estimator: self.estimator,
            fee_policy,
            dust_policy: self.dust_policy,
            dust_threshold: self.dust_threshold(fee_policy)?,
            amount: input.amount,
            available,
            extra_outputs,
        };
        let selection = selection::select(&eligible, &ctx)?;

        build_plan(input, input.amount, available, &eligible, selection)
    }

    /// Spends every provided output into a single recipient output.
    fn plan_max_amount(
        &self,
        input: &SigningInput,
        fee_policy: FeePolicy,
        extra_outputs: usize,
        candidates: &[Candidate<'_>],
        available: u64,
    ) -> Result<TransactionPlan, PlanningError> {
        let fee = fee_policy.fee(self.estimator, candidates.len(), 1 + extra_outputs)?;
        if available <= fee {
            return Err(PlanningError::InsufficientFunds {
                available,
                required: fee.saturating_add(1),
            });
        }

        let selection = Selection {
            indices: (0..candidates.len()).collect(),
            fee,
            change: 0,
            strategy: SelectionStrategy::UseMaxAmount,
        };

        build_plan(input, available - fee, available, candidates, selection)
    }

    /// Plans every request independently; any failure fails the batch.
    #[must_use]
    pub fn plan_batch(&self, inputs: &[SigningInput]) -> BatchResult {
        BatchResult::collect(
            inputs
                .iter()
                .map(|input| self.plan(input).map(|plan| TypedObject::pack(&plan))),
        )
    }
}

/// Number of outputs the request adds on top of recipient and change.
fn memo_outputs(input: &SigningInput) -> Result<usize, PlanningError> {
    let len = input.output_op_return.len();
    if len > MAX_OP_RETURN_BYTES {
        return Err(PlanningError::MemoTooLong {
            len,
            max: MAX_OP_RETURN_BYTES,
        });
    }

    Ok(usize::from(len > 0))
}

/// Validates outpoints and returns the outputs in canonical selection order.
fn collect_candidates(utxos: &[UnspentOutput]) -> Result<Vec<Candidate<'_>>, PlanningError> {
    let mut seen = HashSet::with_capacity(utxos.len());
    let mut candidates = Vec::with_capacity(utxos.len());

    for (position, utxo) in utxos.iter().enumerate() {
        let Some(out_point) = utxo.out_point.as_ref() else {
            return Err(PlanningError::InvalidOutput {
                index: position,
                reason: "missing out_point".to_string(),
            });
        };
        if !seen.insert((out_point.hash.as_slice(), out_point.index)) {
            return Err(PlanningError::InvalidOutput {
                index: position,
                reason: format!(
                    "duplicate outpoint {}:{}",
                    hex::encode(&out_point.hash),
                    out_point.index
                ),
            });
        }

        candidates.push(Candidate {
            amount: utxo.amount,
            hash: &out_point.hash,
            index: out_point.index,
            utxo,
        });
    }

    selection::sort_candidates(&mut candidates);
    Ok(candidates)
}

fn build_plan(
    input: &SigningInput,
    amount: u64,
    available: u64,
    candidates: &[Candidate<'_>],
    selection: Selection,
) -> Result<TransactionPlan, PlanningError> {
    let mut outputs = vec![PlannedOutput {
        role: OutputRole::Recipient.into(),
        address: input.to_address.clone(),
        amount,
        data: Vec::new(),
    }];
    if selection.change > 0 {
        if input.change_address.is_empty() {
            return Err(PlanningError::MissingChangeAddress(selection.change));
        }
        outputs.push(PlannedOutput {
            role: OutputRole::Change.into(),
            address: input.change_address.clone(),
            amount: selection.change,
            data: Vec::new(),
        });
    }
    if !input.output_op_return.is_empty() {
        outputs.push(PlannedOutput {
            role: OutputRole::OpReturn.into(),
            address: String::new(),
            amount: 0,
            data: input.output_op_return.clone(),
        });
    }

    let plan = TransactionPlan {
        amount,
        available_amount: available,
        fee: selection.fee,
        change: selection.change,
        utxos: selection
            .indices
            .iter()
            .map(|index| candidates[*index].utxo.clone())
            .collect(),
        outputs,
        strategy: selection.strategy.into(),
    };

    tracing::debug!(
        strategy = ?selection.strategy,
        inputs = plan.utxos.len(),
        amount = plan.amount,
        fee = plan.fee,
        change = plan.change,
        fingerprint = %plan.fingerprint_hex(),
        "transaction planned"
    );

    Ok(plan)
}
