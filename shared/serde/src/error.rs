use thiserror::Error;

/// Raised when a reader runs out of bits or encounters a value it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Error while deserializing: buffer is truncated or holds an invalid value")]
pub struct SerdeErr;
