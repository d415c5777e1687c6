//! Fee rates, fee policies and transaction size estimators.

use serde::{Deserialize, Serialize};

use crate::error::PlanningError;
use crate::schema::utxo::signing_input::Fee;

/// Fee rate in thousandths of a base unit per estimated byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeeRate {
    milli_per_byte: u64,
}

impl FeeRate {
    pub const ZERO: Self = Self { milli_per_byte: 0 };

    const MILLI_PER_UNIT: u64 = 1_000;

    #[must_use]
    pub const fn from_milli_per_byte(milli_per_byte: u64) -> Self {
        Self { milli_per_byte }
    }

    pub fn per_byte(units: u64) -> Result<Self, PlanningError> {
        units
            .checked_mul(Self::MILLI_PER_UNIT)
            .map(Self::from_milli_per_byte)
            .ok_or_else(|| PlanningError::InvalidFeeRate(format!("byte fee {units} is too large")))
    }

    #[must_use]
    pub const fn milli_per_byte(self) -> u64 {
        self.milli_per_byte
    }

    /// Fee for `size_bytes`, rounded up to a whole base unit.
    pub fn fee_for_size(self, size_bytes: u64) -> Result<u64, PlanningError> {
        let milli = u128::from(size_bytes) * u128::from(self.milli_per_byte);
        let fee = milli.div_ceil(u128::from(Self::MILLI_PER_UNIT));

        u64::try_from(fee).map_err(|_| {
            PlanningError::AmountOverflow(format!("computing the fee for {size_bytes} bytes"))
        })
    }
}

/// How the fee of a transaction is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeePolicy {
    Rate(FeeRate),
    /// Same fee whatever the transaction size.
    Fixed(u64),
}

impl FeePolicy {
    pub fn from_request(fee: Option<&Fee>) -> Result<Self, PlanningError> {
        match fee {
            Some(Fee::ByteFee(units)) => FeeRate::per_byte(*units).map(Self::Rate),
            Some(Fee::ByteFeeMilli(milli)) => Ok(Self::Rate(FeeRate::from_milli_per_byte(*milli))),
            Some(Fee::FixedFee(fee)) => Ok(Self::Fixed(*fee)),
            None => Err(PlanningError::InvalidFeeRate(
                "neither a byte fee nor a fixed fee was provided".to_string(),
            )),
        }
    }

    /// Fee for a transaction with the given shape.
    pub fn fee(
        self,
        estimator: &dyn FeeEstimator,
        inputs: usize,
        outputs: usize,
    ) -> Result<u64, PlanningError> {
        match self {
            Self::Rate(rate) => rate.fee_for_size(estimator.estimated_size(inputs, outputs)),
            Self::Fixed(fee) => Ok(fee),
        }
    }

    /// Marginal cost of spending one more input. Zero under a fixed fee.
    pub fn input_cost(self, estimator: &dyn FeeEstimator) -> Result<u64, PlanningError> {
        match self {
            Self::Rate(rate) => rate.fee_for_size(estimator.input_size()),
            Self::Fixed(_) => Ok(0),
        }
    }
}

/// Pure transaction size model of one chain family.
///
/// Sizes are in (virtual) bytes and must not decrease when inputs or outputs are added.
pub trait FeeEstimator: Send + Sync {
    fn estimated_size(&self, inputs: usize, outputs: usize) -> u64;

    /// Size contributed by a single input.
    fn input_size(&self) -> u64;
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Legacy pay-to-pubkey-hash transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearFeeEstimator;

impl LinearFeeEstimator {
    const OVERHEAD: u64 = 10;
    const INPUT: u64 = 148;
    const OUTPUT: u64 = 34;
}

impl FeeEstimator for LinearFeeEstimator {
    fn estimated_size(&self, inputs: usize, outputs: usize) -> u64 {
        Self::OVERHEAD
            .saturating_add(count(inputs).saturating_mul(Self::INPUT))
            .saturating_add(count(outputs).saturating_mul(Self::OUTPUT))
    }

    fn input_size(&self) -> u64 {
        Self::INPUT
    }
}

/// Native segwit pay-to-witness-pubkey-hash transactions, in virtual bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegwitFeeEstimator;

impl SegwitFeeEstimator {
    const OVERHEAD_WEIGHT: u64 = 42;
    const INPUT_WEIGHT: u64 = 405;
    const OUTPUT_WEIGHT: u64 = 124;
    const WITNESS_SCALE: u64 = 4;
}

impl FeeEstimator for SegwitFeeEstimator {
    fn estimated_size(&self, inputs: usize, outputs: usize) -> u64 {
        Self::OVERHEAD_WEIGHT
            .saturating_add(count(inputs).saturating_mul(Self::INPUT_WEIGHT))
            .saturating_add(count(outputs).saturating_mul(Self::OUTPUT_WEIGHT))
            .div_ceil(Self::WITNESS_SCALE)
    }

    fn input_size(&self) -> u64 {
        Self::INPUT_WEIGHT.div_ceil(Self::WITNESS_SCALE)
    }
}

/// `base + per_input * inputs + per_output * outputs`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantFeeEstimator {
    pub base: u64,
    pub per_input: u64,
    pub per_output: u64,
}

impl FeeEstimator for ConstantFeeEstimator {
    fn estimated_size(&self, inputs: usize, outputs: usize) -> u64 {
        self.base
            .saturating_add(count(inputs).saturating_mul(self.per_input))
            .saturating_add(count(outputs).saturating_mul(self.per_output))
    }

    fn input_size(&self) -> u64 {
        self.per_input
    }
}

/// Serializable choice of estimator for runtime chain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeModel {
    Linear,
    Segwit,
    Constant(ConstantFeeEstimator),
}

impl FeeEstimator for FeeModel {
    fn estimated_size(&self, inputs: usize, outputs: usize) -> u64 {
        match self {
            Self::Linear => LinearFeeEstimator.estimated_size(inputs, outputs),
            Self::Segwit => SegwitFeeEstimator.estimated_size(inputs, outputs),
            Self::Constant(estimator) => estimator.estimated_size(inputs, outputs),
        }
    }

    fn input_size(&self) -> u64 {
        match self {
            Self::Linear => LinearFeeEstimator.input_size(),
            Self::Segwit => SegwitFeeEstimator.input_size(),
            Self::Constant(estimator) => estimator.input_size(),
        }
    }
}
