//! Convenient imports for sortable.
//!
//! ```ignore
//! use sortable::prelude::*;
//!
//! let table = SortableTable::in_memory()?;
//! table.insert(Record::new().with("name", "foo"))?;
//! ```

// Main entry point
pub use crate::table::{SortableBuilder, SortableTable};

// Error handling
pub use crate::error::{Error, Result};

// Records and partitions
pub use sortable_core::{OrderingConfig, OutOfRange, Predicate, Record, RecordKey, Value};

// Storage
pub use sortable_storage::{MemoryStore, RecordStore};
