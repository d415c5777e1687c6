use crate::error::PlanningError;
use crate::planner::fee::{FeeEstimator, FeePolicy};
use crate::planner::params::DustPolicy;
use crate::schema::utxo::{SelectionStrategy, UnspentOutput};

/// Upper bound on DFS nodes visited by `BnB` before deterministic fallback is used.
const MAX_BNB_NODES: usize = 100_000;

/// Projection of one spendable output used for deterministic selection.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Candidate<'a> {
    pub amount: u64,
    pub hash: &'a [u8],
    pub index: u32,
    pub utxo: &'a UnspentOutput,
}

/// Sorts by amount desc, then outpoint hash asc, then index asc.
pub(super) fn sort_candidates(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.hash.cmp(b.hash))
            .then_with(|| a.index.cmp(&b.index))
    });
}

pub(super) struct SelectionContext<'a> {
    pub estimator: &'a dyn FeeEstimator,
    pub fee_policy: FeePolicy,
    pub dust_policy: DustPolicy,
    pub dust_threshold: u64,
    pub amount: u64,
    /// Sum of every provided output, eligible or not.
    pub available: u64,
    /// Outputs every plan carries besides recipient and change (an OP_RETURN memo).
    pub extra_outputs: usize,
}

impl SelectionContext<'_> {
    /// Fee for `inputs` and `outputs` value outputs, plus any extra outputs.
    fn fee(&self, inputs: usize, outputs: usize) -> Result<u64, PlanningError> {
        self.fee_policy
            .fee(self.estimator, inputs, outputs + self.extra_outputs)
    }

    /// `sum - amount - fee(inputs, outputs)`; negative when the inputs fall short.
    fn leftover(&self, sum: u64, inputs: usize, outputs: usize) -> Result<i128, PlanningError> {
        let fee = self.fee(inputs, outputs)?;
        Ok(i128::from(sum) - i128::from(self.amount) - i128::from(fee))
    }

    /// Exclusive upper bound on the excess a changeless plan may leave behind.
    fn changeless_excess_limit(&self) -> i128 {
        match self.dust_policy {
            DustPolicy::FoldIntoFee => i128::from(self.dust_threshold.max(1)),
            DustPolicy::Reject => 1,
        }
    }
}

/// Chosen inputs (indices into the sorted candidates) and the resulting fee split.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Selection {
    pub indices: Vec<usize>,
    pub fee: u64,
    pub change: u64,
    pub strategy: SelectionStrategy,
}

fn to_amount(value: i128, what: &str) -> Result<u64, PlanningError> {
    u64::try_from(value).map_err(|_| PlanningError::AmountOverflow(what.to_string()))
}

/// Build a comparable outpoint-key for one candidate subset.
///
/// The key is sorted so subset order itself does not affect comparisons.
fn subset_lexicographic_key<'a>(
    indices: &[usize],
    candidates: &[Candidate<'a>],
) -> Vec<(&'a [u8], u32)> {
    let mut key = indices
        .iter()
        .map(|index| {
            let candidate = &candidates[*index];
            (candidate.hash, candidate.index)
        })
        .collect::<Vec<_>>();
    key.sort_unstable();
    key
}

/// Compare two changeless subsets by deterministic tie-break rules.
///
/// Preference:
/// 1. fewer selected inputs
/// 2. lexicographically smaller outpoint key
fn is_better_subset(
    proposed: &[usize],
    current_best: Option<&[usize]>,
    candidates: &[Candidate<'_>],
) -> bool {
    let Some(current_best) = current_best else {
        return true;
    };

    if proposed.len() != current_best.len() {
        return proposed.len() < current_best.len();
    }

    subset_lexicographic_key(proposed, candidates)
        < subset_lexicographic_key(current_best, candidates)
}

fn build_suffix_sums(candidates: &[Candidate<'_>]) -> Result<Vec<u64>, PlanningError> {
    let mut suffix_sum = vec![0u64; candidates.len() + 1];
    for index in (0..candidates.len()).rev() {
        suffix_sum[index] = suffix_sum[index + 1]
            .checked_add(candidates[index].amount)
            .ok_or_else(|| {
                PlanningError::AmountOverflow("computing BnB suffix sums".to_string())
            })?;
    }

    Ok(suffix_sum)
}

struct BnbSearch<'a> {
    ctx: &'a SelectionContext<'a>,
    candidates: &'a [Candidate<'a>],
    suffix_sum: &'a [u64],
    excess_limit: i128,
    max_nodes: usize,
    nodes_visited: usize,
    node_limit_hit: bool,
    current: Vec<usize>,
    best: Option<Vec<usize>>,
}

impl<'a> BnbSearch<'a> {
    fn new(
        ctx: &'a SelectionContext<'a>,
        candidates: &'a [Candidate<'a>],
        suffix_sum: &'a [u64],
        max_nodes: usize,
    ) -> Self {
        Self {
            ctx,
            candidates,
            suffix_sum,
            excess_limit: ctx.changeless_excess_limit(),
            max_nodes,
            nodes_visited: 0,
            node_limit_hit: false,
            current: Vec::new(),
            best: None,
        }
    }

    const fn mark_node_visit(&mut self) -> bool {
        self.nodes_visited = self.nodes_visited.saturating_add(1);
        self.nodes_visited > self.max_nodes
    }

    fn record_if_better(&mut self) {
        if is_better_subset(&self.current, self.best.as_deref(), self.candidates) {
            self.best = Some(self.current.clone());
        }
    }

    /// Whether adding every remaining candidate could cover amount and fee.
    fn can_reach_target(&self, index: usize, sum: u64) -> Result<bool, PlanningError> {
        let max_possible = sum.checked_add(self.suffix_sum[index]).ok_or_else(|| {
            PlanningError::AmountOverflow("evaluating BnB pruning bounds".to_string())
        })?;
        let max_inputs = self.current.len() + (self.candidates.len() - index);

        Ok(self.ctx.leftover(max_possible, max_inputs, 1)? >= 0)
    }

    // Every eligible candidate is worth more than the fee it adds, so the excess
    // strictly grows along an include branch.
    fn visit(
        &mut self,
        index: usize,
        sum: u64,
        stack: &mut Vec<Step>,
    ) -> Result<(), PlanningError> {
        if self.mark_node_visit() {
            self.node_limit_hit = true;
            return Ok(());
        }

        if !self.current.is_empty() {
            let excess = self.ctx.leftover(sum, self.current.len(), 1)?;
            if excess >= 0 {
                if excess < self.excess_limit {
                    self.record_if_better();
                }
                return Ok(());
            }
        }
        if index >= self.candidates.len() {
            return Ok(());
        }
        if !self.can_reach_target(index, sum)? {
            return Ok(());
        }

        let included_sum = sum
            .checked_add(self.candidates[index].amount)
            .ok_or_else(|| {
                PlanningError::AmountOverflow("evaluating BnB include branch".to_string())
            })?;

        // Popped in reverse: include subtree, then backtrack, then exclude subtree.
        stack.push(Step::Visit { index: index + 1, sum });
        stack.push(Step::Backtrack);
        stack.push(Step::Visit {
            index: index + 1,
            sum: included_sum,
        });
        self.current.push(index);

        Ok(())
    }

    /// Walks the include-first tree with an explicit stack, so depth is bounded by
    /// memory rather than the thread stack.
    fn run(&mut self) -> Result<(), PlanningError> {
        let mut stack = vec![Step::Visit { index: 0, sum: 0 }];

        while let Some(step) = stack.pop() {
            if self.node_limit_hit {
                break;
            }
            match step {
                Step::Visit { index, sum } => self.visit(index, sum, &mut stack)?,
                Step::Backtrack => {
                    self.current.pop();
                }
            }
        }

        Ok(())
    }
}

enum Step {
    Visit { index: usize, sum: u64 },
    Backtrack,
}

/// Bounded depth-first Branch-and-Bound search for a changeless subset.
///
/// A subset qualifies when its excess over `amount + fee(k, 1)` is below the dust
/// threshold. Hitting the node limit discards the search so the outcome never depends
/// on where the walk stopped.
fn bnb_changeless_subset(
    candidates: &[Candidate<'_>],
    ctx: &SelectionContext<'_>,
) -> Result<Option<Selection>, PlanningError> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let suffix_sum = build_suffix_sums(candidates)?;
    let mut search = BnbSearch::new(ctx, candidates, &suffix_sum, MAX_BNB_NODES);
    search.run()?;

    tracing::trace!(
        nodes_visited = search.nodes_visited,
        node_limit_hit = search.node_limit_hit,
        found = search.best.is_some(),
        "changeless subset search finished"
    );

    if search.node_limit_hit {
        return Ok(None);
    }
    let Some(indices) = search.best else {
        return Ok(None);
    };

    let sum = sum_selected_amount(candidates, &indices)?;
    let base_fee = ctx.fee(indices.len(), 1)?;
    let excess = to_amount(ctx.leftover(sum, indices.len(), 1)?, "computing changeless excess")?;
    let fee = base_fee.checked_add(excess).ok_or_else(|| {
        PlanningError::AmountOverflow("folding excess into the fee".to_string())
    })?;

    Ok(Some(Selection {
        indices,
        fee,
        change: 0,
        strategy: SelectionStrategy::ExactMatch,
    }))
}

/// Deterministic fallback A: the largest output alone, when it covers amount, a
/// two-output fee and a change output of at least the dust threshold.
fn select_single_largest_above_target(
    candidates: &[Candidate<'_>],
    ctx: &SelectionContext<'_>,
) -> Result<Option<Selection>, PlanningError> {
    let Some(largest) = candidates.first() else {
        return Ok(None);
    };

    let change = ctx.leftover(largest.amount, 1, 2)?;
    if change < i128::from(ctx.dust_threshold.max(1)) {
        return Ok(None);
    }

    Ok(Some(Selection {
        indices: vec![0],
        fee: ctx.fee(1, 2)?,
        change: to_amount(change, "computing change")?,
        strategy: SelectionStrategy::SingleLargest,
    }))
}

/// Deterministic fallback B: accumulate largest-first, re-evaluating the fee for every
/// input count, until the inputs cover the amount with either a change output above
/// the dust threshold or an acceptable changeless leftover.
fn select_largest_first_accumulation(
    candidates: &[Candidate<'_>],
    ctx: &SelectionContext<'_>,
) -> Result<Selection, PlanningError> {
    let threshold = i128::from(ctx.dust_threshold.max(1));
    let mut sum = 0u64;
    let mut rejected_dust = None;

    for (position, candidate) in candidates.iter().enumerate() {
        sum = sum.checked_add(candidate.amount).ok_or_else(|| {
            PlanningError::AmountOverflow("running fallback accumulation".to_string())
        })?;
        let inputs = position + 1;

        let change = ctx.leftover(sum, inputs, 2)?;
        if change >= threshold {
            return Ok(Selection {
                indices: (0..inputs).collect(),
                fee: ctx.fee(inputs, 2)?,
                change: to_amount(change, "computing change")?,
                strategy: SelectionStrategy::LargestFirst,
            });
        }

        let excess = ctx.leftover(sum, inputs, 1)?;
        if excess < 0 {
            continue;
        }
        if excess == 0 || ctx.dust_policy == DustPolicy::FoldIntoFee {
            let fee = ctx
                .fee(inputs, 1)?
                .checked_add(to_amount(excess, "computing changeless excess")?)
                .ok_or_else(|| {
                    PlanningError::AmountOverflow("folding excess into the fee".to_string())
                })?;
            return Ok(Selection {
                indices: (0..inputs).collect(),
                fee,
                change: 0,
                strategy: SelectionStrategy::LargestFirst,
            });
        }
        rejected_dust.get_or_insert(to_amount(excess, "computing dust leftover")?);
    }

    if let Some(change) = rejected_dust {
        return Err(PlanningError::DustChange {
            change,
            threshold: ctx.dust_threshold,
        });
    }

    // Measured against the eligible set: uneconomical outputs never help.
    let minimum_fee = ctx.fee(candidates.len(), 1)?;
    Err(PlanningError::InsufficientFunds {
        available: ctx.available,
        required: ctx.amount.saturating_add(minimum_fee),
    })
}

/// Sum selected candidate amounts with overflow checks.
fn sum_selected_amount(
    candidates: &[Candidate<'_>],
    selected_indices: &[usize],
) -> Result<u64, PlanningError> {
    selected_indices.iter().try_fold(0u64, |sum, index| {
        sum.checked_add(candidates[*index].amount).ok_or_else(|| {
            PlanningError::AmountOverflow("summing selected inputs".to_string())
        })
    })
}

/// Runs the strategies in order: changeless exact match, single largest above target,
/// largest-first accumulation. The first strategy producing a plan wins.
///
/// Candidates must be eligible (each worth more than the fee it adds) and sorted with
/// [`sort_candidates`].
pub(super) fn select(
    candidates: &[Candidate<'_>],
    ctx: &SelectionContext<'_>,
) -> Result<Selection, PlanningError> {
    if let Some(selection) = bnb_changeless_subset(candidates, ctx)? {
        return Ok(selection);
    }
    if let Some(selection) = select_single_largest_above_target(candidates, ctx)? {
        return Ok(selection);
    }

    select_largest_first_accumulation(candidates, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::fee::{ConstantFeeEstimator, FeeRate};
    use crate::schema::utxo::OutPoint;

    fn outputs(amounts: &[(u8, u32, u64)]) -> Vec<UnspentOutput> {
        amounts
            .iter()
            .map(|(hash_byte, index, amount)| UnspentOutput {
                out_point: Some(OutPoint {
                    hash: vec![*hash_byte; 32],
                    index: *index,
                    sequence: 0,
                }),
                script: Vec::new(),
                amount: *amount,
            })
            .collect()
    }

    fn candidates(utxos: &[UnspentOutput]) -> Vec<Candidate<'_>> {
        let mut candidates = utxos
            .iter()
            .map(|utxo| {
                let out_point = utxo.out_point.as_ref().expect("test outputs have outpoints");
                Candidate {
                    amount: utxo.amount,
                    hash: &out_point.hash,
                    index: out_point.index,
                    utxo,
                }
            })
            .collect::<Vec<_>>();
        sort_candidates(&mut candidates);
        candidates
    }

    fn fixed_fee_context(estimator: &dyn FeeEstimator, amount: u64, fee: u64) -> SelectionContext<'_> {
        SelectionContext {
            estimator,
            fee_policy: FeePolicy::Fixed(fee),
            dust_policy: DustPolicy::FoldIntoFee,
            dust_threshold: 1,
            amount,
            available: 0,
            extra_outputs: 0,
        }
    }

    #[test]
    fn sort_orders_by_amount_then_outpoint() {
        let utxos = outputs(&[(2, 0, 50), (1, 1, 50), (1, 0, 50), (0, 0, 10), (9, 9, 70)]);
        let sorted = candidates(&utxos)
            .iter()
            .map(|candidate| (candidate.amount, candidate.hash[0], candidate.index))
            .collect::<Vec<_>>();

        assert_eq!(
            sorted,
            vec![(70, 9, 9), (50, 1, 0), (50, 1, 1), (50, 2, 0), (10, 0, 0)]
        );
    }

    #[test]
    fn fewer_inputs_win_before_outpoint_order() {
        let utxos = outputs(&[(1, 0, 30), (2, 0, 30), (3, 0, 60)]);
        let candidates = candidates(&utxos);

        // candidates: [60 (0x03), 30 (0x01), 30 (0x02)]
        assert!(is_better_subset(&[0], Some(&[1, 2]), &candidates));
        assert!(!is_better_subset(&[1, 2], Some(&[0]), &candidates));
        assert!(is_better_subset(&[1], Some(&[2]), &candidates));
        assert!(is_better_subset(&[2], None, &candidates));
    }

    #[test]
    fn exact_search_prefers_single_input() {
        let estimator = ConstantFeeEstimator::default();
        let utxos = outputs(&[(1, 0, 40), (2, 0, 60), (3, 0, 20)]);
        let candidates = candidates(&utxos);
        let ctx = fixed_fee_context(&estimator, 60, 0);

        let selection = bnb_changeless_subset(&candidates, &ctx)
            .expect("no overflow")
            .expect("60 matches exactly");
        assert_eq!(selection.indices, vec![0]);
        assert_eq!(selection.fee, 0);
    }

    #[test]
    fn node_limit_discards_partial_search() {
        let estimator = ConstantFeeEstimator::default();
        let utxos = outputs(&[(1, 0, 9), (2, 0, 7), (3, 0, 5), (4, 0, 3)]);
        let candidates = candidates(&utxos);
        let ctx = fixed_fee_context(&estimator, 8, 0);
        let suffix_sum = build_suffix_sums(&candidates).expect("no overflow");

        let mut bounded = BnbSearch::new(&ctx, &candidates, &suffix_sum, 2);
        bounded.run().expect("no overflow");
        assert!(bounded.node_limit_hit);

        let mut unbounded = BnbSearch::new(&ctx, &candidates, &suffix_sum, MAX_BNB_NODES);
        unbounded.run().expect("no overflow");
        assert!(!unbounded.node_limit_hit);
        // 5 + 3 covers 8 exactly.
        assert_eq!(unbounded.best, Some(vec![2, 3]));
    }

    #[test]
    fn deep_search_stays_off_the_call_stack() {
        let estimator = ConstantFeeEstimator::default();
        let utxos = (0..10_000u32)
            .map(|index| UnspentOutput {
                out_point: Some(OutPoint {
                    hash: vec![7; 32],
                    index,
                    sequence: 0,
                }),
                script: Vec::new(),
                amount: 10,
            })
            .collect::<Vec<_>>();
        let candidates = candidates(&utxos);
        let ctx = fixed_fee_context(&estimator, 100_000, 0);
        let suffix_sum = build_suffix_sums(&candidates).expect("no overflow");

        let mut search = BnbSearch::new(&ctx, &candidates, &suffix_sum, MAX_BNB_NODES);
        search.run().expect("no overflow");

        // The first include-only path reaches all 10 000 inputs.
        assert_eq!(search.best.map(|best| best.len()), Some(10_000));
        assert!(!search.node_limit_hit);
    }

    #[test]
    fn extra_outputs_raise_every_fee() {
        let estimator = ConstantFeeEstimator {
            base: 0,
            per_input: 10,
            per_output: 5,
        };
        let mut ctx = SelectionContext {
            estimator: &estimator,
            fee_policy: FeePolicy::Rate(FeeRate::per_byte(1).expect("fits")),
            dust_policy: DustPolicy::FoldIntoFee,
            dust_threshold: 1,
            amount: 0,
            available: 0,
            extra_outputs: 0,
        };
        assert_eq!(ctx.fee(2, 1).expect("fits"), 25);

        ctx.extra_outputs = 1;
        assert_eq!(ctx.fee(2, 1).expect("fits"), 30);
    }

    #[test]
    fn suffix_sums_report_overflow() {
        let utxos = outputs(&[(1, 0, u64::MAX), (2, 0, 1)]);
        let err = build_suffix_sums(&candidates(&utxos)).expect_err("overflows");
        assert!(matches!(err, PlanningError::AmountOverflow(_)));
    }
}
