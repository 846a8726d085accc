//! # Sortable
//!
//! Dense, gapless display order for records grouped by a partition key.
//!
//! Sortable keeps an integer rank on every record so that, within each
//! partition, ranks are exactly `1..=N`. Inserts append, deletes compact, and
//! moves shift the records in between by one, all inside one transaction.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sortable::prelude::*;
//!
//! // One list per (company, author), ranked by `position`
//! let articles = SortableTable::builder()
//!     .field("position")
//!     .condition_fields(["company_id", "author_id"])
//!     .open()?;
//!
//! let first = articles.insert(Record::new().with("company_id", 1).with("author_id", 1))?;
//! let second = articles.insert(Record::new().with("company_id", 1).with("author_id", 1))?;
//!
//! // Drag the second record to the top
//! articles.sort(second.require_key()?, 1)?;
//!
//! // Remove the first; the list closes up
//! articles.delete(first.require_key()?)?;
//! ```
//!
//! ## Layers
//!
//! - [`SortableTable`] - hooks the orderer into insert, update and delete
//! - [`Orderer`] - the ordering protocol over any [`RecordStore`]
//! - [`RecordStore`] - the storage interface; [`MemoryStore`] implements it

#![warn(missing_docs)]

mod error;
mod table;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use table::{SortableBuilder, SortableTable};

// Re-export the layers underneath
pub use sortable_core::{
    OrderingConfig, OutOfRange, Predicate, RangeFilter, RankRange, Record, RecordKey, Shift,
    Value, DEFAULT_RANK_FIELD,
};
pub use sortable_engine::{invariant, transaction, Orderer};
pub use sortable_storage::{FailPoint, MemoryStore, RecordStore};
