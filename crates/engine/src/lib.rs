//! Rank maintenance engine for sortable
//!
//! This crate implements the ordering protocol over any [`RecordStore`]:
//! - [`Orderer`]: rank assignment on create, compaction on delete, moves
//! - [`transaction()`]: all-or-nothing execution with rollback on failure
//! - [`invariant`]: density checks for tests and audits
//!
//! [`RecordStore`]: sortable_storage::RecordStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod invariant;
pub mod orderer;
pub mod transaction;

pub use orderer::Orderer;
pub use transaction::transaction;
