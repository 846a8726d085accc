//! Storage layer for sortable
//!
//! This crate defines the record store the orderer runs against:
//! - [`RecordStore`]: transactional get / count / scan / insert / update /
//!   bulk rank shift / delete
//! - [`MemoryStore`]: in-memory reference implementation with nested
//!   transactions and fault injection ([`FailPoint`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod traits;

pub use memory::{FailPoint, MemoryStore};
pub use traits::RecordStore;
