//! The record store interface
//!
//! The orderer never touches storage directly. Everything it needs goes
//! through [`RecordStore`]: single-record reads and writes, a partition count,
//! and one bulk primitive that shifts the rank of every record in a range by
//! one. All of it runs inside transactions the caller (or the transaction
//! wrapper) controls.

use sortable_core::{Predicate, RangeFilter, Record, RecordKey, Result, Shift, Value};

/// Transactional record storage consumed by the orderer
///
/// # Transactions
///
/// Transactions nest. Each [`begin`](RecordStore::begin) opens a savepoint;
/// [`commit`](RecordStore::commit) releases the innermost one and
/// [`rollback`](RecordStore::rollback) restores it. Changes become permanent
/// only when the outermost transaction commits. `commit` and `rollback`
/// without an open transaction fail with `TransactionNotActive`.
///
/// # Isolation
///
/// The orderer performs read-then-write sequences (count then assign, read
/// rank then shift). Implementations must either serialize ordering mutations
/// per partition or provide serializable isolation for range updates.
pub trait RecordStore {
    /// Open a transaction (or a nested savepoint)
    fn begin(&self) -> Result<()>;

    /// Release the innermost transaction
    fn commit(&self) -> Result<()>;

    /// Undo everything since the innermost `begin`
    fn rollback(&self) -> Result<()>;

    /// Read a record by key
    ///
    /// Fails with `NotFound` if no record has this key.
    fn get(&self, key: RecordKey) -> Result<Record>;

    /// Count records matching a predicate
    fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// All records matching a predicate, in key order
    fn scan(&self, predicate: &Predicate) -> Result<Vec<Record>>;

    /// Persist a new record and return it with its key
    ///
    /// A record without a key is assigned the next free key. A record that
    /// carries a key already in use fails with `Conflict`.
    fn insert(&self, record: Record) -> Result<Record>;

    /// Assign fields of one record
    fn update_one(&self, key: RecordKey, assignments: &[(String, Value)]) -> Result<()>;

    /// Shift the rank field of every record matched by `filter` by one
    ///
    /// Returns the number of records shifted. Records in the partition whose
    /// rank is `Null` are not matched.
    fn update_many(&self, filter: &RangeFilter, shift: Shift) -> Result<u64>;

    /// Remove a record and return it as it was stored
    fn delete(&self, key: RecordKey) -> Result<Record>;
}
