//! Error types for the resource cache.
//!
//! Reads are total: an absent path, model, or request is `None`, never an
//! error. The only fallible operation is identifier extraction, which
//! surfaces here instead of being swallowed.

use thiserror::Error;

/// Main error type for cache operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record has no identifier under key {0:?}")]
    IdMissing(String),

    #[error("identifier value is not a string or integer: {0}")]
    IdInvalid(serde_json::Value),

    #[error("cannot extract an identifier from a non-object payload")]
    NotAnObject,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, StoreError>;
