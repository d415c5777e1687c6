#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![cfg_attr(
    test,
    allow(clippy::needless_pass_by_value, clippy::too_many_lines)
)]

pub mod entry;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod utxo;

pub use entry::{ChainSigner, SchemaInfo};
pub use envelope::dispatch_global;
pub use error::{DispatchError, RegistryError, SignerFailure};
pub use registry::{SignerRegistry, SignerRegistryBuilder, global, install_global};
pub use signing_abi::CoinType;
pub use utxo::{CompiledTransaction, TransactionCompiler, UtxoChainEntry};
