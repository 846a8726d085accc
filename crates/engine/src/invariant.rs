//! Density checks
//!
//! Ranks within a partition must be exactly `{1, ..., N}`. Nothing in the
//! write path checks this; these functions exist for tests and for callers
//! who want to audit a table after the fact.

use rustc_hash::FxHashMap;
use sortable_core::{Error, OrderingConfig, Predicate, Record, Result, Value};
use sortable_storage::RecordStore;

/// Verify the ranks of one partition are dense
///
/// Returns the partition size on success, `InvariantViolation` naming the
/// first problem otherwise.
pub fn check_partition<S: RecordStore + ?Sized>(
    store: &S,
    field: &str,
    partition: &Predicate,
) -> Result<u64> {
    let records = store.scan(partition)?;
    check_records(field, partition, &records)
}

/// Verify every partition present in the store is dense
///
/// Partitions are discovered by grouping all records on the configured
/// partition fields. Returns the number of partitions checked.
pub fn check_all<S: RecordStore + ?Sized>(store: &S, config: &OrderingConfig) -> Result<usize> {
    let mut partitions: FxHashMap<Predicate, Vec<Record>> = FxHashMap::default();
    for record in store.scan(&Predicate::all())? {
        partitions
            .entry(config.partition_of(&record))
            .or_default()
            .push(record);
    }
    for (partition, records) in &partitions {
        check_records(&config.field, partition, records)?;
    }
    Ok(partitions.len())
}

fn check_records(field: &str, partition: &Predicate, records: &[Record]) -> Result<u64> {
    let violation = |reason: String| Error::InvariantViolation {
        partition: partition.to_string(),
        reason,
    };

    let mut ranks = Vec::with_capacity(records.len());
    for record in records {
        match record.get(field) {
            Value::Int(rank) => ranks.push(*rank),
            other => {
                return Err(violation(format!(
                    "record {} has {} rank",
                    record.key.map(|k| k.to_string()).unwrap_or_default(),
                    other.type_name()
                )))
            }
        }
    }
    ranks.sort_unstable();

    for (i, rank) in ranks.iter().enumerate() {
        let expected = i as i64 + 1;
        if *rank == expected {
            continue;
        }
        let reason = if i > 0 && ranks[i - 1] == *rank {
            format!("duplicate rank {}", rank)
        } else {
            format!("expected rank {}, found {}", expected, rank)
        };
        return Err(violation(reason));
    }
    Ok(ranks.len() as u64)
}
