//! Atomicity Tests
//!
//! Every ordering write runs in one transaction. A failure anywhere inside it
//! must leave every rank exactly as it was before the call.

use crate::common::*;

const SECTION_IDS: [i64; 6] = [1, 2, 3, 4, 5, 6];
const SECTION_RANKS: [i64; 6] = [1, 2, 3, 4, 5, 6];

fn assert_untouched(table: &SortableTable) {
    assert_ranks(table, &SECTION_IDS, &SECTION_RANKS);
    assert!(!table.store().in_transaction());
    assert_eq!(table.verify_all().unwrap(), 1);
}

#[test]
fn move_shift_failure_rolls_back() {
    let table = sections();
    table.store().fail_next(FailPoint::UpdateMany);

    let err = table.sort(key(1), 3).unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert!(err.is_retryable());
    assert_untouched(&table);
}

#[test]
fn move_write_failure_undoes_shift() {
    let table = sections();
    // The shift succeeds; the moved record's own write fails
    table.store().fail_next(FailPoint::UpdateOne);

    assert!(table.sort(key(5), 2).is_err());

    assert_untouched(&table);
}

#[test]
fn move_commit_failure_rolls_back() {
    let table = sections();
    table.store().fail_next(FailPoint::Commit);

    assert!(table.sort(key(6), 1).is_err());

    assert_untouched(&table);
}

#[test]
fn move_retry_after_failure() {
    let table = sections();
    table.store().fail_next(FailPoint::UpdateMany);

    assert!(table.sort(key(1), 3).unwrap_err().is_retryable());
    table.sort(key(1), 3).unwrap();

    assert_ranks(&table, &SECTION_IDS, &[3, 1, 2, 4, 5, 6]);
}

#[test]
fn insert_failure_leaves_no_record() {
    let table = sections();
    table.store().fail_next(FailPoint::Insert);

    assert!(table.insert(Record::new().with("name", "lost")).is_err());

    assert_eq!(table.store().len(), 6);
    assert_untouched(&table);

    let saved = table.insert(Record::new().with("name", "kept")).unwrap();
    assert_eq!(saved.get("display_order"), &Value::Int(7));
}

#[test]
fn insert_count_failure_leaves_no_record() {
    let table = sections();
    table.store().fail_next(FailPoint::Count);

    assert!(table.insert(Record::new()).is_err());

    assert_untouched(&table);
}

#[test]
fn delete_compaction_failure_restores_record() {
    let table = sections();
    table.store().fail_next(FailPoint::UpdateMany);

    assert!(table.delete(key(2)).is_err());

    let restored = table.get(key(2)).unwrap();
    assert_eq!(restored.get("name").as_str(), Some("bar"));
    assert_untouched(&table);
}

#[test]
fn caller_transaction_rollback_discards_nested_moves() {
    let table = sections();
    let store = table.store();

    store.begin().unwrap();
    table.sort(key(1), 6).unwrap();
    table.sort(key(2), 5).unwrap();
    assert_eq!(store.transaction_depth(), 1);
    store.rollback().unwrap();

    assert_untouched(&table);
}

#[test]
fn caller_transaction_commit_keeps_nested_moves() {
    let table = sections();
    let store = table.store();

    store.begin().unwrap();
    table.sort(key(1), 6).unwrap();
    store.commit().unwrap();

    assert_ranks(&table, &SECTION_IDS, &[6, 1, 2, 3, 4, 5]);
    assert!(!store.in_transaction());
}

#[test]
fn orderer_over_store_directly() {
    let table = sections();
    let orderer = Orderer::new(OrderingConfig::default()).unwrap();
    let store = table.store().as_ref();

    store.fail_next(FailPoint::UpdateOne);
    assert!(orderer.move_to(store, key(4), 1).is_err());
    assert_untouched(&table);

    let moved = orderer.move_to(store, key(4), 1).unwrap();
    assert_eq!(moved.get("display_order"), &Value::Int(1));
    assert_eq!(orderer.verify(store, &Predicate::all()).unwrap(), 6);
}
