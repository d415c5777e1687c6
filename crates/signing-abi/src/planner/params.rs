//! Runtime parameters describing how one UTXO chain plans transactions.

use serde::{Deserialize, Serialize};

use crate::coin::CoinType;
use crate::error::ConfigError;
use crate::planner::fee::FeeModel;

/// What to do with change worth less than the dust threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DustPolicy {
    /// Drop the change output and pay the leftover as fee.
    #[default]
    FoldIntoFee,
    /// Refuse plans that would leave a non-zero sub-dust leftover.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainParams {
    pub coin_type: CoinType,
    pub name: String,
    pub fee_model: FeeModel,
    #[serde(default)]
    pub dust_policy: DustPolicy,
    /// Smallest change output the chain relays, in base units.
    #[serde(default)]
    pub min_change: u64,
}

impl ChainParams {
    #[must_use]
    pub fn bitcoin() -> Self {
        Self {
            coin_type: CoinType::BITCOIN,
            name: "bitcoin".to_string(),
            fee_model: FeeModel::Segwit,
            dust_policy: DustPolicy::FoldIntoFee,
            min_change: 546,
        }
    }

    #[must_use]
    pub fn litecoin() -> Self {
        Self {
            coin_type: CoinType::LITECOIN,
            name: "litecoin".to_string(),
            fee_model: FeeModel::Segwit,
            dust_policy: DustPolicy::FoldIntoFee,
            min_change: 546,
        }
    }

    #[must_use]
    pub fn dogecoin() -> Self {
        Self {
            coin_type: CoinType::DOGECOIN,
            name: "dogecoin".to_string(),
            fee_model: FeeModel::Linear,
            dust_policy: DustPolicy::FoldIntoFee,
            min_change: 1_000_000,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "chain name must not be empty for {}",
                self.coin_type
            )));
        }

        if let FeeModel::Constant(estimator) = self.fee_model
            && estimator.base == 0
            && estimator.per_input == 0
            && estimator.per_output == 0
        {
            return Err(ConfigError::Invalid(format!(
                "constant fee model for '{}' must have a non-zero size term",
                self.name
            )));
        }

        Ok(())
    }
}

/// Parameters for every configured chain, at most one entry per coin type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainParamsSet {
    #[serde(default)]
    pub chains: Vec<ChainParams>,
}

impl ChainParamsSet {
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            chains: vec![
                ChainParams::bitcoin(),
                ChainParams::litecoin(),
                ChainParams::dogecoin(),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;

        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (position, chain) in self.chains.iter().enumerate() {
            chain.validate()?;

            if self.chains[..position]
                .iter()
                .any(|earlier| earlier.coin_type == chain.coin_type)
            {
                return Err(ConfigError::DuplicateCoin(chain.coin_type.value()));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn get(&self, coin_type: CoinType) -> Option<&ChainParams> {
        self.chains.iter().find(|chain| chain.coin_type == coin_type)
    }
}
