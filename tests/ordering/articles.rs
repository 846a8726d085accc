//! Partitioned Ordering Tests
//!
//! Articles are ranked on `position` separately for every
//! (company_id, author_id) pair.

use crate::common::*;

const ALL_IDS: [i64; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[test]
fn create_ranks_each_partition_from_one() {
    let table = articles();

    assert_ranks(&table, &ALL_IDS, &[1, 1, 2, 1, 2, 3, 1, 1, 1, 2, 3]);
    assert_eq!(table.verify_all().unwrap(), 6);
}

#[test]
fn create_appends_to_its_own_partition() {
    let table = articles();

    let saved = table
        .insert(
            Record::new()
                .with("company_id", 2)
                .with("author_id", 3)
                .with("title", "baz4"),
        )
        .unwrap();

    assert_eq!(saved.key, Some(key(12)));
    assert_eq!(saved.get("position"), &Value::Int(4));

    let fresh = table
        .insert(Record::new().with("company_id", 9).with("author_id", 9))
        .unwrap();
    assert_eq!(fresh.get("position"), &Value::Int(1));
    assert_eq!(table.verify_all().unwrap(), 7);
}

#[test]
fn update_keeps_rank() {
    let table = articles();

    let mut article = table.get(key(5)).unwrap();
    article.set("title", "baz2 (edited)");
    table.save(article).unwrap();

    assert_ranks(&table, &ALL_IDS, &[1, 1, 2, 1, 2, 3, 1, 1, 1, 2, 3]);
}

#[test]
fn delete_compacts_only_its_partition() {
    let table = articles();

    table.delete(key(2)).unwrap();
    table.delete(key(10)).unwrap();

    assert_ranks(
        &table,
        &[1, 3, 4, 5, 6, 7, 8, 9, 11],
        &[1, 1, 1, 2, 3, 1, 1, 1, 2],
    );
    assert_eq!(table.verify_all().unwrap(), 6);
}

#[test]
fn move_upward() {
    let table = articles();

    table.sort(key(2), 2).unwrap();
    table.sort(key(9), 3).unwrap();

    assert_ranks(&table, &ALL_IDS, &[1, 2, 1, 1, 2, 3, 1, 1, 3, 1, 2]);
}

#[test]
fn move_downward() {
    let table = articles();

    table.sort(key(3), 1).unwrap();
    table.sort(key(6), 2).unwrap();
    table.sort(key(11), 1).unwrap();

    assert_ranks(&table, &ALL_IDS, &[1, 2, 1, 1, 3, 2, 1, 1, 2, 3, 1]);
}

#[test]
fn move_bound_is_partition_size() {
    let table = articles();

    // (2, 2) holds two articles
    let err = table.sort(key(2), 3).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    // (1, 1) holds one; its only valid rank is 1
    assert!(table.sort(key(1), 2).is_err());
    table.sort(key(1), 1).unwrap();

    assert_ranks(&table, &ALL_IDS, &[1, 1, 2, 1, 2, 3, 1, 1, 1, 2, 3]);
}

#[test]
fn list_one_partition() {
    let table = articles();
    table.sort(key(6), 1).unwrap();

    let partition = Predicate::all().and_eq("company_id", 2).and_eq("author_id", 3);
    let titles: Vec<String> = table
        .list(&partition)
        .unwrap()
        .iter()
        .map(|r| r.get("title").as_str().unwrap().to_string())
        .collect();

    assert_eq!(titles, vec!["baz3", "baz1", "baz2"]);
    assert_eq!(table.count(&partition).unwrap(), 3);
    assert_eq!(table.verify(&partition).unwrap(), 3);
}

#[test]
fn partition_of_uses_condition_fields() {
    let table = articles();
    let article = table.get(key(4)).unwrap();

    let partition = table.partition_of(&article);

    assert_eq!(
        partition,
        Predicate::all().and_eq("company_id", 2).and_eq("author_id", 3)
    );
    assert!(partition.matches(&table.get(key(6)).unwrap()));
    assert!(!partition.matches(&table.get(key(2)).unwrap()));
}

/// Moving a record between partitions with a plain update keeps its old
/// rank. Neither partition is renumbered, which `verify_all` reports.
#[test]
fn editing_partition_fields_does_not_rebalance() {
    let table = articles();

    let mut article = table.get(key(10)).unwrap();
    article.set("company_id", 2);
    article.set("author_id", 2);
    let updated = table.save(article).unwrap();

    assert_eq!(updated.get("position"), &Value::Int(2));
    assert_ranks(&table, &ALL_IDS, &[1, 1, 2, 1, 2, 3, 1, 1, 1, 2, 3]);

    let err = table.verify_all().unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(_)));
    assert!(err.is_serious());
}
