#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![cfg_attr(
    test,
    allow(
        clippy::cast_possible_truncation,
        clippy::default_trait_access,
        clippy::iter_on_single_items,
        clippy::needless_pass_by_value,
        clippy::too_many_lines
    )
)]

pub mod aggregate;
pub mod amount;
pub mod coin;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod planner;
pub mod schema;

pub use aggregate::UnpackError;
pub use amount::BeAmount;
pub use coin::CoinType;
pub use encoding::Encodable;
pub use error::{AmountError, ConfigError, EncodingError, PlanningError};
pub use planner::params::{ChainParams, ChainParamsSet, DustPolicy};
pub use planner::fee::{
    ConstantFeeEstimator, FeeEstimator, FeeModel, FeePolicy, FeeRate, LinearFeeEstimator,
    SegwitFeeEstimator,
};
pub use planner::{Planner, plan_transaction};
pub use schema::common::{SigningErrorCode, SigningErrorInfo};
pub use schema::result::{BatchResult, TypedObject};
