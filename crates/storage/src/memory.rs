//! In-memory record store
//!
//! [`MemoryStore`] is the reference [`RecordStore`]: a single table held in an
//! `FxHashMap` behind one lock, with nested transactions and one-shot fault
//! injection.
//!
//! # Design
//!
//! - FxHashMap: O(1) lookups by key, fast non-crypto hash
//! - parking_lot Mutex: every operation is atomic with respect to the others
//! - Savepoints: `begin()` clones the table; `rollback()` swaps the clone back
//!
//! The store models one connection. Its transaction stack is shared by every
//! caller, so concurrent writers must serialize their transactions themselves.

use crate::traits::RecordStore;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use sortable_core::{Error, Predicate, RangeFilter, Record, RecordKey, Result, Shift, Value};
use std::fmt;
use tracing::{debug, trace};

/// Store operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `count()`
    Count,
    /// `get()`
    Get,
    /// `scan()`
    Scan,
    /// `insert()`
    Insert,
    /// `update_one()`
    UpdateOne,
    /// `update_many()`
    UpdateMany,
    /// `delete()`
    Delete,
    /// `commit()`
    Commit,
}

impl fmt::Display for FailPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailPoint::Count => "count",
            FailPoint::Get => "get",
            FailPoint::Scan => "scan",
            FailPoint::Insert => "insert",
            FailPoint::UpdateOne => "update_one",
            FailPoint::UpdateMany => "update_many",
            FailPoint::Delete => "delete",
            FailPoint::Commit => "commit",
        };
        write!(f, "{}", name)
    }
}

/// Table contents captured by `begin()`
#[derive(Debug, Clone)]
struct Savepoint {
    rows: FxHashMap<RecordKey, Record>,
    next_key: i64,
}

#[derive(Debug)]
struct Inner {
    rows: FxHashMap<RecordKey, Record>,
    next_key: i64,
    savepoints: Vec<Savepoint>,
    faults: FxHashSet<FailPoint>,
}

impl Inner {
    fn check(&mut self, point: FailPoint) -> Result<()> {
        if self.faults.remove(&point) {
            debug!(%point, "Injected store failure");
            return Err(Error::store(format!("injected failure in {}", point)));
        }
        Ok(())
    }
}

/// In-memory transactional record store
///
/// # Example
///
/// ```ignore
/// use sortable_storage::{MemoryStore, RecordStore};
/// use sortable_core::{Predicate, Record};
///
/// let store = MemoryStore::new();
/// let saved = store.insert(Record::new().with("name", "foo"))?;
/// assert_eq!(store.count(&Predicate::all())?, 1);
/// ```
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store; the first assigned key is 1
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows: FxHashMap::default(),
                next_key: 1,
                savepoints: Vec::new(),
                faults: FxHashSet::default(),
            }),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().rows.is_empty()
    }

    /// Depth of the open transaction stack (0 when none is open)
    pub fn transaction_depth(&self) -> usize {
        self.inner.lock().savepoints.len()
    }

    /// Check if a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.transaction_depth() > 0
    }

    /// Make the next call of `point` fail with a store error
    ///
    /// The failure fires once and is then disarmed.
    pub fn fail_next(&self, point: FailPoint) {
        self.inner.lock().faults.insert(point);
    }

    /// Disarm every pending injected failure
    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("rows", &inner.rows.len())
            .field("next_key", &inner.next_key)
            .field("depth", &inner.savepoints.len())
            .finish()
    }
}

impl RecordStore for MemoryStore {
    // ========================================================================
    // Transactions
    // ========================================================================

    fn begin(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let savepoint = Savepoint {
            rows: inner.rows.clone(),
            next_key: inner.next_key,
        };
        inner.savepoints.push(savepoint);
        trace!(depth = inner.savepoints.len(), "Transaction begin");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.savepoints.is_empty() {
            return Err(Error::TransactionNotActive);
        }
        // The transaction stays open on failure so the caller can roll back
        inner.check(FailPoint::Commit)?;
        inner.savepoints.pop();
        trace!(depth = inner.savepoints.len(), "Transaction commit");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let savepoint = inner.savepoints.pop().ok_or(Error::TransactionNotActive)?;
        inner.rows = savepoint.rows;
        inner.next_key = savepoint.next_key;
        debug!(depth = inner.savepoints.len(), "Transaction rolled back");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn get(&self, key: RecordKey) -> Result<Record> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::Get)?;
        inner.rows.get(&key).cloned().ok_or(Error::NotFound { key })
    }

    fn count(&self, predicate: &Predicate) -> Result<u64> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::Count)?;
        Ok(inner.rows.values().filter(|r| predicate.matches(r)).count() as u64)
    }

    fn scan(&self, predicate: &Predicate) -> Result<Vec<Record>> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::Scan)?;
        let mut out: Vec<Record> = inner
            .rows
            .values()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.key);
        Ok(out)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    fn insert(&self, mut record: Record) -> Result<Record> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::Insert)?;

        let key = match record.key {
            Some(key) => {
                if inner.rows.contains_key(&key) {
                    return Err(Error::Conflict {
                        message: format!("duplicate key {}", key),
                    });
                }
                key
            }
            None => RecordKey::new(inner.next_key),
        };
        inner.next_key = inner.next_key.max(key.as_i64() + 1);
        record.key = Some(key);
        inner.rows.insert(key, record.clone());
        Ok(record)
    }

    fn update_one(&self, key: RecordKey, assignments: &[(String, Value)]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::UpdateOne)?;
        let record = inner.rows.get_mut(&key).ok_or(Error::NotFound { key })?;
        for (field, value) in assignments {
            record.set(field.clone(), value.clone());
        }
        Ok(())
    }

    fn update_many(&self, filter: &RangeFilter, shift: Shift) -> Result<u64> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::UpdateMany)?;

        // Validate every candidate before mutating anything
        let mut targets = Vec::new();
        for (key, record) in inner.rows.iter() {
            if !filter.partition.matches(record) {
                continue;
            }
            let rank = match record.get(&filter.field) {
                Value::Null => continue,
                Value::Int(rank) => *rank,
                other => {
                    return Err(Error::TypeMismatch {
                        field: filter.field.clone(),
                        expected: "Int",
                        actual: other.type_name(),
                    })
                }
            };
            if filter.range.contains(rank) {
                let shifted = rank
                    .checked_add(shift.delta())
                    .ok_or_else(|| Error::store(format!("rank overflow on record {}", key)))?;
                targets.push((*key, shifted));
            }
        }

        for (key, rank) in &targets {
            if let Some(record) = inner.rows.get_mut(key) {
                record.set(filter.field.clone(), *rank);
            }
        }
        Ok(targets.len() as u64)
    }

    fn delete(&self, key: RecordKey) -> Result<Record> {
        let mut inner = self.inner.lock();
        inner.check(FailPoint::Delete)?;
        inner.rows.remove(&key).ok_or(Error::NotFound { key })
    }
}

// ============================================================================
// Tests
// ============================================================================
