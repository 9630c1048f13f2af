//! Serialization layer between typed payloads and stored bytes.
//!
//! The repository only depends on the [`Codec`] trait. Any format works as
//! long as `decode(encode(v)) == v` for every value of the declared type.

mod json;

pub use json::JsonCodec;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while converting values to and from bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// the value could not be serialized
    #[error("encode error: {0}")]
    Encode(#[source] BoxError),

    /// the bytes are malformed or do not match the expected type
    #[error("decode error: {0}")]
    Decode(#[source] BoxError),
}

impl CodecError {
    pub fn encode(err: impl Into<BoxError>) -> Self {
        Self::Encode(err.into())
    }

    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }
}

/// result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// An encode/decode pair. Implementations must be free of side effects.
pub trait Codec {
    fn encode<V: Serialize + ?Sized>(&self, value: &V) -> CodecResult<Vec<u8>>;

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<V>;
}

impl<C: Codec> Codec for &C {
    fn encode<V: Serialize + ?Sized>(&self, value: &V) -> CodecResult<Vec<u8>> {
        (**self).encode(value)
    }

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<V> {
        (**self).decode(bytes)
    }
}
