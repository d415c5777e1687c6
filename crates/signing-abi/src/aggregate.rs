//! Folding per-item outcomes into a [`BatchResult`].

use std::fmt::Display;

use prost::{Message, Name};
use thiserror::Error;

use crate::schema::result::{BatchResult, TypedObject};

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("Type mismatch: expected '{expected}', found '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    #[error("Failed to decode '{type_url}': {source}")]
    Decode {
        type_url: String,
        #[source]
        source: prost::DecodeError,
    },
}

impl TypedObject {
    #[must_use]
    pub fn pack<M: Message + Name>(message: &M) -> Self {
        Self {
            type_url: M::type_url(),
            value: message.encode_to_vec(),
        }
    }

    pub fn unpack<M: Message + Name + Default>(&self) -> Result<M, UnpackError> {
        let expected = M::type_url();
        if self.type_url != expected {
            return Err(UnpackError::TypeMismatch {
                expected,
                actual: self.type_url.clone(),
            });
        }

        M::decode(self.value.as_slice()).map_err(|source| UnpackError::Decode {
            type_url: expected,
            source,
        })
    }

    #[must_use]
    pub fn is<M: Name>(&self) -> bool {
        self.type_url == M::type_url()
    }
}

impl BatchResult {
    #[must_use]
    pub fn succeeded(objects: Vec<TypedObject>) -> Self {
        Self {
            success: true,
            error: String::new(),
            objects,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            objects: Vec::new(),
        }
    }

    /// Collects item outcomes in order. One failing item fails the whole batch; the
    /// error text lists every failure as `#<index>: <error>`.
    pub fn collect<I, E>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<TypedObject, E>>,
        E: Display,
    {
        let mut objects = Vec::new();
        let mut failures = Vec::new();

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(object) => objects.push(object),
                Err(error) => failures.push(format!("#{index}: {error}")),
            }
        }

        if failures.is_empty() {
            Self::succeeded(objects)
        } else {
            Self::failed(failures.join("; "))
        }
    }

    /// The objects, or `None` when the batch failed.
    #[must_use]
    pub fn objects(&self) -> Option<&[TypedObject]> {
        self.success.then_some(self.objects.as_slice())
    }
}
