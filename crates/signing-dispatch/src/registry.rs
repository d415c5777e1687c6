//! Coin-type keyed table of chain signers.
//!
//! A [`SignerRegistry`] is assembled once through [`SignerRegistryBuilder`] and is
//! immutable afterwards. [`install_global`] freezes one registry for the whole
//! process; lookups through [`global`] take no lock.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use signing_abi::CoinType;

use crate::entry::{ChainSigner, ErasedEntry, SchemaInfo, Typed};
use crate::error::RegistryError;

static GLOBAL_REGISTRY: OnceLock<SignerRegistry> = OnceLock::new();

#[derive(Clone, Default)]
pub struct SignerRegistry {
    entries: Arc<BTreeMap<CoinType, Arc<dyn ErasedEntry>>>,
}

#[derive(Default)]
pub struct SignerRegistryBuilder {
    entries: BTreeMap<CoinType, Arc<dyn ErasedEntry>>,
}

impl SignerRegistryBuilder {
    pub fn register<S: ChainSigner>(
        mut self,
        coin_type: CoinType,
        signer: S,
    ) -> Result<Self, RegistryError> {
        if self.entries.contains_key(&coin_type) {
            return Err(RegistryError::DuplicateCoin(coin_type));
        }

        self.entries.insert(coin_type, Arc::new(Typed(signer)));
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> SignerRegistry {
        SignerRegistry {
            entries: Arc::new(self.entries),
        }
    }
}

impl SignerRegistry {
    #[must_use]
    pub fn builder() -> SignerRegistryBuilder {
        SignerRegistryBuilder::default()
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn supports(&self, coin_type: CoinType) -> bool {
        self.entries.contains_key(&coin_type)
    }

    /// Registered coin types in ascending order.
    pub fn coin_types(&self) -> impl Iterator<Item = CoinType> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn schema(&self, coin_type: CoinType) -> Option<SchemaInfo> {
        self.entries.get(&coin_type).map(|entry| entry.schema())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry(&self, coin_type: CoinType) -> Option<&dyn ErasedEntry> {
        self.entries.get(&coin_type).map(AsRef::as_ref)
    }
}

impl fmt::Debug for SignerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerRegistry")
            .field(
                "coin_types",
                &self
                    .entries
                    .keys()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Freezes `registry` as the process-wide registry. Only the first call succeeds.
pub fn install_global(registry: SignerRegistry) -> Result<&'static SignerRegistry, RegistryError> {
    let coin_types = registry.len();
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    tracing::debug!(coin_types, "global signer registry installed");

    GLOBAL_REGISTRY.get().ok_or(RegistryError::AlreadyInstalled)
}

#[must_use]
pub fn global() -> Option<&'static SignerRegistry> {
    GLOBAL_REGISTRY.get()
}
