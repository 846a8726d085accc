//! Unified error types for sortable.
//!
//! This module provides a flat error type that wraps the layered internal
//! errors and presents a consistent interface to users.

use thiserror::Error;

/// All sortable errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage failure; the enclosing transaction has been rolled back
    #[error("storage error: {0}")]
    Storage(String),

    /// Ranks in a partition are duplicated or non-contiguous
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid input (rank out of range, missing or mistyped field)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Conflicting write (duplicate key)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (bug or misuse of the transaction protocol)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for sortable operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Retrying the whole operation may succeed after a storage failure or a
    /// conflict. Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Conflict(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Internal(_) | Error::InvariantViolation(_))
    }
}

// Convert from internal core errors
impl From<sortable_core::Error> for Error {
    fn from(e: sortable_core::Error) -> Self {
        use sortable_core::Error as CoreError;
        match e {
            CoreError::NotFound { key } => Error::NotFound(format!("record {}", key)),
            CoreError::Store { message } => Error::Storage(message),
            CoreError::InvariantViolation { partition, reason } => {
                Error::InvariantViolation(format!("[{}] {}", partition, reason))
            }
            CoreError::RankOutOfRange { rank, size } => Error::ConstraintViolation(format!(
                "rank {} out of range 1..={}",
                rank, size
            )),
            CoreError::MissingField { field } => {
                Error::ConstraintViolation(format!("missing field: {}", field))
            }
            CoreError::TypeMismatch {
                field,
                expected,
                actual,
            } => Error::ConstraintViolation(format!(
                "field {}: expected {}, got {}",
                field, expected, actual
            )),
            CoreError::Conflict { message } => Error::Conflict(message),
            CoreError::TransactionNotActive => {
                Error::Internal("no active transaction".to_string())
            }
            CoreError::Config { message } => Error::Config(message),
        }
    }
}
