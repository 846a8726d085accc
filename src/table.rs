//! Ordered table entry point.
//!
//! This module provides [`SortableTable`], which pairs a record store with an
//! [`Orderer`] and calls the ordering hooks around every write: the rank is
//! assigned before an insert, compacted after a delete, and left alone by
//! plain updates.

use crate::error::Result;
use parking_lot::Mutex;
use sortable_core::{OrderingConfig, OutOfRange, Predicate, Record, RecordKey};
use sortable_engine::{transaction, Orderer};
use sortable_storage::{MemoryStore, RecordStore};
use std::sync::Arc;
use tracing::debug;

/// A table whose records carry a dense rank per partition.
///
/// Create one with [`SortableTable::builder`], or over your own store with
/// [`SortableTable::with_store`].
///
/// # Example
///
/// ```ignore
/// use sortable::prelude::*;
///
/// let articles = SortableTable::builder()
///     .field("position")
///     .condition_fields(["company_id", "author_id"])
///     .open()?;
///
/// let a = articles.insert(Record::new().with("company_id", 2).with("author_id", 3))?;
/// let b = articles.insert(Record::new().with("company_id", 2).with("author_id", 3))?;
/// assert_eq!(b.get("position"), &Value::Int(2));
///
/// // Drag b to the top of its list
/// articles.sort(b.require_key()?, 1)?;
/// ```
///
/// # Thread Safety
///
/// Writes through the table are serialized by an internal lock, so the
/// count-then-assign and read-then-shift sequences of two callers never
/// interleave. Writes that bypass the table must provide their own
/// serialization.
pub struct SortableTable<S: RecordStore = MemoryStore> {
    store: Arc<S>,
    orderer: Orderer,
    /// Serializes ordering mutations across callers
    write_lock: Mutex<()>,
}

impl SortableTable<MemoryStore> {
    /// Create a builder for table configuration.
    pub fn builder() -> SortableBuilder {
        SortableBuilder::new()
    }

    /// Open an in-memory table with the default configuration.
    ///
    /// Ranks live in `display_order` and all records share one partition.
    pub fn in_memory() -> Result<Self> {
        Self::builder().open()
    }
}

impl<S: RecordStore> SortableTable<S> {
    /// Open a table over an existing store.
    pub fn with_store(store: Arc<S>, config: OrderingConfig) -> Result<Self> {
        let orderer = Orderer::new(config)?;
        Ok(Self {
            store,
            orderer,
            write_lock: Mutex::new(()),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The orderer maintaining this table's ranks.
    pub fn orderer(&self) -> &Orderer {
        &self.orderer
    }

    /// The ordering configuration.
    pub fn config(&self) -> &OrderingConfig {
        self.orderer.config()
    }

    /// Partition predicate of `record` under this table's configuration.
    pub fn partition_of(&self, record: &Record) -> Predicate {
        self.orderer.partition_of(record)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a record at the end of its partition.
    ///
    /// The rank is assigned and the record persisted in one transaction. Any
    /// rank the record already carries is replaced, so a copy of a stored
    /// record or one returned by [`delete`](Self::delete) can be inserted
    /// again. A supplied key is kept; it must not already exist.
    /// Returns the stored record with its key and rank.
    pub fn insert(&self, record: Record) -> Result<Record> {
        let _guard = self.write_lock.lock();
        self.insert_locked(record)
    }

    /// Write every field of `record` except the rank.
    ///
    /// The rank is never changed by an update. Changing a partition field
    /// here moves the record to another partition without renumbering either
    /// one; use [`verify_all`](Self::verify_all) to detect the result.
    pub fn update(&self, record: &Record) -> Result<Record> {
        let _guard = self.write_lock.lock();
        self.update_locked(record)
    }

    /// Insert `record` unless its key is already stored, otherwise
    /// [`update`](Self::update) it.
    ///
    /// A record without a key is always inserted. A record with a key is
    /// updated when that key exists and inserted under it when it does not.
    pub fn save(&self, record: Record) -> Result<Record> {
        let _guard = self.write_lock.lock();
        let key = match record.key {
            None => return self.insert_locked(record),
            Some(key) => key,
        };
        match self.store.get(key) {
            Ok(_) => self.update_locked(&record),
            Err(e) if e.is_not_found() => self.insert_locked(record),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_locked(&self, mut record: Record) -> Result<Record> {
        let saved = transaction(self.store.as_ref(), |store| {
            self.orderer.assign_on_create(store, &mut record)?;
            store.insert(record)
        })?;
        debug!(key = ?saved.key, "Inserted ranked record");
        Ok(saved)
    }

    fn update_locked(&self, record: &Record) -> Result<Record> {
        let key = record.require_key()?;
        let field = self.orderer.field();
        let assignments: Vec<_> = record
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != field)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let updated = transaction(self.store.as_ref(), |store| {
            let before = self.orderer.partition_of(&store.get(key)?);
            store.update_one(key, &assignments)?;
            let updated = store.get(key)?;
            let after = self.orderer.partition_of(&updated);
            if before != after {
                debug!(
                    %key,
                    from = %before,
                    to = %after,
                    "Partition fields changed; ranks not rebalanced"
                );
            }
            Ok(updated)
        })?;
        Ok(updated)
    }

    /// Delete a record and close the gap it leaves.
    ///
    /// Returns the removed record as it was stored.
    pub fn delete(&self, key: RecordKey) -> Result<Record> {
        let _guard = self.write_lock.lock();
        let removed = transaction(self.store.as_ref(), |store| {
            let removed = store.delete(key)?;
            self.orderer.compact_on_delete(store, &removed)?;
            Ok(removed)
        })?;
        Ok(removed)
    }

    /// Move a record to `new_rank` within its partition.
    ///
    /// Records between the old and new position shift by one. Returns the
    /// moved record with its new rank.
    pub fn sort(&self, key: RecordKey, new_rank: i64) -> Result<Record> {
        let _guard = self.write_lock.lock();
        Ok(self.orderer.move_to(self.store.as_ref(), key, new_rank)?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read a record by key.
    pub fn get(&self, key: RecordKey) -> Result<Record> {
        Ok(self.store.get(key)?)
    }

    /// Records matching `partition`, in rank order.
    ///
    /// Records without a rank sort last; ties break on key.
    pub fn list(&self, partition: &Predicate) -> Result<Vec<Record>> {
        let field = self.orderer.field();
        let mut records = self.store.scan(partition)?;
        records.sort_by_key(|r| (r.get(field).as_int().unwrap_or(i64::MAX), r.key));
        Ok(records)
    }

    /// Number of records matching `partition`.
    pub fn count(&self, partition: &Predicate) -> Result<u64> {
        Ok(self.store.count(partition)?)
    }

    /// Verify one partition is dense; returns its size.
    pub fn verify(&self, partition: &Predicate) -> Result<u64> {
        Ok(self.orderer.verify(self.store.as_ref(), partition)?)
    }

    /// Verify every partition is dense; returns the number checked.
    pub fn verify_all(&self) -> Result<usize> {
        Ok(self.orderer.verify_all(self.store.as_ref())?)
    }
}

/// Builder for table configuration.
///
/// # Example
///
/// ```ignore
/// // Global ordering on the default `display_order` field
/// let sections = SortableTable::builder().open()?;
///
/// // Per company+author ordering, clamping out-of-range moves
/// let articles = SortableTable::builder()
///     .field("position")
///     .condition_fields(["company_id", "author_id"])
///     .out_of_range(OutOfRange::Clamp)
///     .open()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SortableBuilder {
    config: OrderingConfig,
}

impl SortableBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a TOML configuration document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(Self {
            config: OrderingConfig::from_toml_str(s)?,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: OrderingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rank field name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.config = self.config.field(field);
        self
    }

    /// Set the partition-key fields.
    pub fn condition_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.config = self.config.condition_fields(fields);
        self
    }

    /// Set how out-of-range move targets are handled.
    pub fn out_of_range(mut self, policy: OutOfRange) -> Self {
        self.config = self.config.out_of_range(policy);
        self
    }

    /// Open the table over a fresh in-memory store.
    pub fn open(self) -> Result<SortableTable<MemoryStore>> {
        self.open_with(Arc::new(MemoryStore::new()))
    }

    /// Open the table over `store`.
    pub fn open_with<S: RecordStore>(self, store: Arc<S>) -> Result<SortableTable<S>> {
        SortableTable::with_store(store, self.config)
    }
}
