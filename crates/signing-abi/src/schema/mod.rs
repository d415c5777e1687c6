//! Wire data contracts, one module per chain family.
//!
//! Messages are protobuf encoded with stable field tags: unknown fields are skipped
//! and absent fields decode to their defaults, so older and newer peers interoperate.

macro_rules! message_names {
    ($package:literal => $($message:ident),+ $(,)?) => {
        $(
            impl ::prost::Name for $message {
                const NAME: &'static str = stringify!($message);
                const PACKAGE: &'static str = $package;
            }
        )+
    };
}

pub mod any;
pub mod common;
pub mod evm;
pub mod result;
pub mod utxo;
