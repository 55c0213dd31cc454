//! Error types for strata-reasoner

use crate::adapter::QueryMode;
use thiserror::Error;

/// Result type alias using ReasonerError
pub type Result<T> = std::result::Result<T, ReasonerError>;

/// Reasoner error type
///
/// Pattern mismatches, incompatible bindings and rules that do not apply
/// are not errors: they simply contribute nothing to a round.
#[derive(Error, Debug)]
pub enum ReasonerError {
    /// Error from the underlying store, propagated unchanged
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// A triggered rule still has more than one unresolved body pattern
    ///
    /// Multi-pattern body joins are not supported; the query is aborted.
    #[error(
        "unsupported multi-pattern body: rule '{rule}' has {remaining} unresolved body patterns"
    )]
    UnsupportedBody { rule: String, remaining: usize },

    /// Dataset and language scopes name different query modes
    #[error(
        "scope mismatch: dataset store queried in {dataset} mode, language store in {language} mode"
    )]
    ScopeMismatch {
        dataset: QueryMode,
        language: QueryMode,
    },

    /// A rule that can never be used (empty body or head)
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReasonerError {
    /// Create an invalid rule error
    pub fn invalid_rule(msg: impl Into<String>) -> Self {
        ReasonerError::InvalidRule(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ReasonerError::Config(msg.into())
    }

    /// True for errors caused by the rule set rather than the data or store
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ReasonerError::UnsupportedBody { .. }
                | ReasonerError::InvalidRule(_)
                | ReasonerError::Config(_)
        )
    }
}
