//! Error types for strata-core

use crate::version::Version;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Store-related errors (I/O failure, corruption, backend faults)
    #[error("Store error: {0}")]
    Store(String),

    /// The store was closed and can no longer serve requests
    #[error("Store is closed")]
    Closed,

    /// Append targeted a version older than the newest ingested one
    #[error("Invalid version {version}: store is already at version {max}")]
    InvalidVersion { version: Version, max: Version },

    /// A triple that cannot be stored (missing addition flag, variable term)
    #[error("Invalid triple: {0}")]
    InvalidTriple(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    /// Create an invalid triple error
    pub fn invalid_triple(msg: impl Into<String>) -> Self {
        Error::InvalidTriple(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
