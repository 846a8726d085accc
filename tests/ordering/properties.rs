//! Property Tests
//!
//! Random sequences of inserts, deletes, moves and plain updates are applied
//! to a table and to a simple model (one `Vec` of keys per group, in rank
//! order). After every step each group must list exactly the model's keys.

use crate::common::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

const GROUPS: i64 = 3;

#[derive(Debug, Clone)]
enum Op {
    Insert { group: i64 },
    Delete { group: i64, pick: usize },
    Move { group: i64, pick: usize, target: usize },
    Rename { group: i64, pick: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..GROUPS).prop_map(|group| Op::Insert { group }),
        1 => (0..GROUPS, any::<usize>()).prop_map(|(group, pick)| Op::Delete { group, pick }),
        3 => (0..GROUPS, any::<usize>(), any::<usize>())
            .prop_map(|(group, pick, target)| Op::Move { group, pick, target }),
        1 => (0..GROUPS, any::<usize>()).prop_map(|(group, pick)| Op::Rename { group, pick }),
    ]
}

fn grouped_table() -> SortableTable {
    SortableTable::builder()
        .field("rank")
        .condition_fields(["group"])
        .open()
        .unwrap()
}

fn group_of(group: i64) -> Predicate {
    Predicate::all().and_eq("group", group)
}

fn listed_keys(table: &SortableTable, group: i64) -> Vec<RecordKey> {
    table
        .list(&group_of(group))
        .unwrap()
        .iter()
        .map(|r| r.key.unwrap())
        .collect()
}

fn apply(table: &SortableTable, model: &mut BTreeMap<i64, Vec<RecordKey>>, op: &Op) {
    match *op {
        Op::Insert { group } => {
            let saved = table.insert(Record::new().with("group", group)).unwrap();
            model.entry(group).or_default().push(saved.key.unwrap());
        }
        Op::Delete { group, pick } => {
            let keys = model.entry(group).or_default();
            if keys.is_empty() {
                return;
            }
            let key = keys.remove(pick % keys.len());
            table.delete(key).unwrap();
        }
        Op::Move {
            group,
            pick,
            target,
        } => {
            let keys = model.entry(group).or_default();
            if keys.is_empty() {
                return;
            }
            let target = target % keys.len();
            let key = keys.remove(pick % keys.len());
            keys.insert(target, key);
            let moved = table.sort(key, target as i64 + 1).unwrap();
            assert_eq!(moved.int("rank").unwrap(), target as i64 + 1);
        }
        Op::Rename { group, pick } => {
            let keys = model.entry(group).or_default();
            if keys.is_empty() {
                return;
            }
            let mut record = table.get(keys[pick % keys.len()]).unwrap();
            record.set("name", format!("renamed-{}", pick));
            table.save(record).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ranks_track_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let table = grouped_table();
        let mut model: BTreeMap<i64, Vec<RecordKey>> = BTreeMap::new();

        for op in &ops {
            apply(&table, &mut model, op);
            for group in 0..GROUPS {
                let expected = model.get(&group).cloned().unwrap_or_default();
                prop_assert_eq!(listed_keys(&table, group), expected);
            }
        }

        let non_empty = model.values().filter(|keys| !keys.is_empty()).count();
        prop_assert_eq!(table.verify_all().unwrap(), non_empty);
        prop_assert!(!table.store().in_transaction());
    }

    #[test]
    fn move_there_and_back_restores_ranks(size in 1i64..20, pick in 1i64..20, target in 1i64..20) {
        let pick = (pick - 1) % size + 1;
        let target = (target - 1) % size + 1;
        let table = SortableTable::in_memory().unwrap();
        for _ in 0..size {
            table.insert(Record::new()).unwrap();
        }
        let before = ranks_by_id(&table);

        // Key n starts at rank n
        let key = RecordKey::new(pick);
        table.sort(key, target).unwrap();
        table.sort(key, pick).unwrap();

        prop_assert_eq!(ranks_by_id(&table), before);
    }

    #[test]
    fn out_of_range_move_changes_nothing(size in 1i64..15, pick in 1i64..15, target in -5i64..30) {
        prop_assume!(target < 1 || target > size);
        let pick = (pick - 1) % size + 1;
        let table = SortableTable::in_memory().unwrap();
        for _ in 0..size {
            table.insert(Record::new()).unwrap();
        }
        let before = ranks_by_id(&table);

        let err = table.sort(RecordKey::new(pick), target).unwrap_err();

        prop_assert!(matches!(err, Error::ConstraintViolation(_)));
        prop_assert_eq!(ranks_by_id(&table), before);
    }

    #[test]
    fn clamped_move_lands_at_an_end(size in 1i64..15, pick in 1i64..15, target in -5i64..30) {
        let pick = (pick - 1) % size + 1;
        let table = SortableTable::builder()
            .out_of_range(OutOfRange::Clamp)
            .open()
            .unwrap();
        for _ in 0..size {
            table.insert(Record::new()).unwrap();
        }

        let moved = table.sort(RecordKey::new(pick), target).unwrap();

        prop_assert_eq!(moved.int("display_order").unwrap(), target.clamp(1, size));
        prop_assert_eq!(table.verify(&Predicate::all()).unwrap(), size as u64);
    }
}
