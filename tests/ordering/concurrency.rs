//! Concurrent Writer Tests
//!
//! Writers on separate threads share one table. The table serializes ordering
//! writes, so ranks must stay dense however the threads interleave.

use crate::common::*;
use std::sync::Arc;
use std::thread;

const THREADS: i64 = 4;
const PER_THREAD: i64 = 25;

#[test]
fn concurrent_inserts_get_distinct_ranks() {
    init_tracing();
    let table = SortableTable::in_memory().unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let table = &table;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    table
                        .insert(Record::new().with("thread", t).with("seq", i))
                        .unwrap();
                }
            });
        }
    });

    let size = (THREADS * PER_THREAD) as u64;
    assert_eq!(table.verify(&Predicate::all()).unwrap(), size);

    let mut ranks: Vec<i64> = ranks_by_id(&table).into_iter().map(|(_, r)| r).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=size as i64).collect::<Vec<_>>());
}

#[test]
fn concurrent_moves_and_deletes_stay_dense() {
    init_tracing();
    let table = Arc::new(
        SortableTable::builder()
            .condition_fields(["group"])
            .open()
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let group = t % 2;
                let mut mine = Vec::new();
                for _ in 0..PER_THREAD {
                    let saved = table.insert(Record::new().with("group", group)).unwrap();
                    mine.push(saved.require_key().unwrap());
                }
                // Drag each record to the top, then drop every third one
                for (i, key) in mine.iter().enumerate() {
                    table.sort(*key, 1).unwrap();
                    if i % 3 == 0 {
                        table.delete(*key).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let deleted_per_thread = (PER_THREAD + 2) / 3;
    let per_group = 2 * (PER_THREAD - deleted_per_thread);
    for group in 0..2 {
        let partition = Predicate::all().and_eq("group", group);
        assert_eq!(table.verify(&partition).unwrap(), per_group as u64);
    }
    assert_eq!(table.verify_all().unwrap(), 2);
    assert!(!table.store().in_transaction());
}
