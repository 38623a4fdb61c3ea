//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, illegal
/// state, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input) before any state change.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is illegal for the record's current state
    /// (e.g. payment against a cancelled invoice).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Two mutations raced (stale version / optimistic concurrency). The losing
    /// caller retries; nothing is partially applied.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An external dataset record is missing an expected field. Reporting paths
    /// degrade such records to a zero contribution instead of aborting.
    #[error("data integrity: {0}")]
    DataIntegrity(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }
}
