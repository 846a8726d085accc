//! Rank maintenance
//!
//! The [`Orderer`] keeps the rank field of an ordered table dense within each
//! partition. It has three write paths and no others may touch the rank:
//!
//! - [`assign_on_create`](Orderer::assign_on_create): a new record gets
//!   `partition size + 1`
//! - [`compact_on_delete`](Orderer::compact_on_delete): every rank above the
//!   removed one moves down by one
//! - [`move_to`](Orderer::move_to): the records between the old and the new
//!   position shift by one, then the moved record takes the new rank
//!
//! ## Move
//!
//! ```text
//! current < target (later):   ranks in (current, target] -= 1
//! current > target (earlier): ranks in [target, current) += 1
//! current == target:          no shift
//! then:                       record.rank = target
//! ```
//!
//! The shift always runs before the moved record is written, and both happen
//! in one transaction.
//!
//! ## Partitions
//!
//! A record's partition is computed from its field values at the time of each
//! call. Editing a partition field through a plain update does not rebalance
//! either the old or the new partition.

use crate::invariant;
use crate::transaction::transaction;
use sortable_core::{
    Error, OrderingConfig, OutOfRange, Predicate, RangeFilter, RankRange, Record, RecordKey,
    Result, Shift, Value,
};
use sortable_storage::RecordStore;
use tracing::{debug, info};

/// Maintains a dense rank over the partitions of one table
#[derive(Debug, Clone)]
pub struct Orderer {
    config: OrderingConfig,
}

impl Orderer {
    /// Create an orderer
    ///
    /// Fails with `Config` if the configuration does not validate.
    pub fn new(config: OrderingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this orderer was built with
    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Name of the rank field
    pub fn field(&self) -> &str {
        &self.config.field
    }

    /// Partition predicate of `record`, from its current field values
    pub fn partition_of(&self, record: &Record) -> Predicate {
        self.config.partition_of(record)
    }

    /// Give a record about to be inserted the next rank in its partition
    ///
    /// Sets the rank field to `count(partition) + 1` on the in-memory record,
    /// replacing any rank it already carries; persisting it is up to the
    /// caller. Call this only on the insert path: the record must not be in
    /// the store yet, whether or not it already has a key.
    ///
    /// Run this in the same transaction as the insert that follows it.
    pub fn assign_on_create<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        record: &mut Record,
    ) -> Result<()> {
        let partition = self.partition_of(record);
        let count = store.count(&partition)?;
        let rank = count as i64 + 1;
        record.set(self.config.field.clone(), rank);

        debug!(partition = %partition, rank, "Assigned rank on create");
        Ok(())
    }

    /// Close the gap left by a removed record
    ///
    /// `record` is the record as it was before deletion: its rank and
    /// partition fields decide which ranks move down. Returns the number of
    /// records shifted. A record that never had a rank shifts nothing.
    pub fn compact_on_delete<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        record: &Record,
    ) -> Result<u64> {
        let rank = match record.get(&self.config.field) {
            Value::Null => {
                debug!(key = ?record.key, "Deleted record had no rank; nothing to compact");
                return Ok(0);
            }
            _ => record.int(&self.config.field)?,
        };

        let filter = RangeFilter::new(
            self.partition_of(record),
            self.config.field.clone(),
            RankRange::above(rank),
        );
        let shifted = store.update_many(&filter, Shift::Decrement)?;

        debug!(filter = %filter, shifted, "Compacted ranks after delete");
        Ok(shifted)
    }

    /// Move a record to `new_rank` within its partition
    ///
    /// Runs in its own transaction (nested if the caller already opened one).
    /// On any failure every rank is left as it was before the call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `key` does not resolve to a record
    /// - `RankOutOfRange` if `new_rank` is outside `[1, N]` and the policy is
    ///   [`OutOfRange::Reject`]
    /// - `Store` if any read or write fails
    ///
    /// # Example
    ///
    /// ```ignore
    /// // ids 1..=6 ranked 1..=6; move id 1 to third place
    /// let moved = orderer.move_to(&store, RecordKey::new(1), 3)?;
    /// // ranks by id are now [3, 1, 2, 4, 5, 6]
    /// ```
    pub fn move_to<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        key: RecordKey,
        new_rank: i64,
    ) -> Result<Record> {
        transaction(store, |store| {
            let mut record = store.get(key)?;
            let current = record.int(&self.config.field)?;
            let partition = self.partition_of(&record);
            let target = self.resolve_target(store, &partition, new_rank)?;

            let shift = if target > current {
                Some((RankRange::left_open(current, target), Shift::Decrement))
            } else if target < current {
                Some((RankRange::right_open(target, current), Shift::Increment))
            } else {
                None
            };

            if let Some((range, direction)) = shift {
                let filter = RangeFilter::new(partition, self.config.field.clone(), range);
                let shifted = store.update_many(&filter, direction)?;
                debug!(filter = %filter, ?direction, shifted, "Shifted ranks for move");
            }

            store.update_one(key, &[(self.config.field.clone(), Value::Int(target))])?;
            record.set(self.config.field.clone(), target);

            info!(%key, from = current, to = target, "Moved record");
            Ok(record)
        })
    }

    /// Verify the partition described by `partition` is dense
    ///
    /// Returns the partition size.
    pub fn verify<S: RecordStore + ?Sized>(&self, store: &S, partition: &Predicate) -> Result<u64> {
        invariant::check_partition(store, &self.config.field, partition)
    }

    /// Verify every partition in the store is dense
    ///
    /// Returns the number of partitions checked.
    pub fn verify_all<S: RecordStore + ?Sized>(&self, store: &S) -> Result<usize> {
        invariant::check_all(store, &self.config)
    }

    fn resolve_target<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        partition: &Predicate,
        new_rank: i64,
    ) -> Result<i64> {
        if self.config.out_of_range == OutOfRange::Unchecked {
            return Ok(new_rank);
        }

        let size = store.count(partition)?;
        let max = size as i64;
        if (1..=max).contains(&new_rank) {
            return Ok(new_rank);
        }

        match self.config.out_of_range {
            OutOfRange::Clamp => {
                let clamped = new_rank.clamp(1, max.max(1));
                debug!(requested = new_rank, clamped, size, "Clamped move target");
                Ok(clamped)
            }
            _ => Err(Error::RankOutOfRange {
                rank: new_rank,
                size,
            }),
        }
    }
}
