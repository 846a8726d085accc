//! Error types for the ordering layer
//!
//! Every fallible operation in the store, the orderer and the transaction
//! wrapper returns [`Result`]. Store failures are never swallowed: they are
//! surfaced after the enclosing transaction has been rolled back.

use crate::types::RecordKey;
use thiserror::Error;

/// Errors raised by record stores and the orderer
#[derive(Debug, Error)]
pub enum Error {
    /// The key does not resolve to a stored record
    #[error("record not found: {key}")]
    NotFound {
        /// Key that was looked up
        key: RecordKey,
    },

    /// Underlying persistence or query failure
    #[error("store error: {message}")]
    Store {
        /// Description of the failure
        message: String,
    },

    /// Ranks within a partition are duplicated or non-contiguous
    #[error("invariant violation in partition [{partition}]: {reason}")]
    InvariantViolation {
        /// Display form of the partition predicate
        partition: String,
        /// What was found
        reason: String,
    },

    /// Requested rank lies outside `[1, size]`
    #[error("rank {rank} out of range 1..={size}")]
    RankOutOfRange {
        /// Rank that was requested
        rank: i64,
        /// Current partition size
        size: u64,
    },

    /// A field the operation needs is not set
    #[error("missing field: {field}")]
    MissingField {
        /// Field name
        field: String,
    },

    /// A field holds a value of the wrong type
    #[error("field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Expected type name
        expected: &'static str,
        /// Actual type name
        actual: &'static str,
    },

    /// Write conflicts with existing state (e.g. duplicate key)
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Commit or rollback without an open transaction
    #[error("no active transaction")]
    TransactionNotActive,

    /// Invalid ordering configuration
    #[error("invalid configuration: {message}")]
    Config {
        /// What is wrong with it
        message: String,
    },
}

/// Result type for ordering operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a [`Error::Store`] error
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Config`] error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is a persistence failure
    pub fn is_store(&self) -> bool {
        matches!(self, Error::Store { .. })
    }

    /// Check if retrying the whole transaction may succeed
    ///
    /// Store failures and conflicts are transient from the orderer's point of
    /// view; the orderer itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store { .. } | Error::Conflict { .. })
    }
}
