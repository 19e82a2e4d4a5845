use super::{BinarySearchTree, BstError, Element};
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use std::collections::BTreeMap as StdBTreeMap;
use test_strategy::proptest;

#[derive(Debug, Clone)]
enum Operation {
    Insert { key: u8, value: u32 },
    Delete(u8),
    Find(u8),
    Rotate { key: u8, kind: u8 },
}

// Keys are drawn from a small domain so that duplicates, misses and rotations
// around existing nodes are all frequent.
fn op_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (any::<u8>(), any::<u32>()).prop_map(|(key, value)| Operation::Insert { key, value }),
        2 => any::<u8>().prop_map(Operation::Delete),
        1 => any::<u8>().prop_map(Operation::Find),
        2 => (any::<u8>(), 0..4u8).prop_map(|(key, kind)| Operation::Rotate { key, kind }),
    ]
}

// Runs random operations against a tree and a std BTreeMap and checks that
// both hold the same elements in the same order.
#[proptest(cases = 64)]
fn comprehensive(#[strategy(pvec(op_strategy(), 1..400))] ops: Vec<Operation>) {
    let mut tree = BinarySearchTree::new();
    let mut std_map = StdBTreeMap::new();

    for op in ops {
        match op {
            Operation::Insert { key, value } => {
                let res = tree.insert(Element::new(key, value));
                if std_map.contains_key(&key) {
                    prop_assert_eq!(res, Err(BstError::DuplicateKey));
                } else {
                    prop_assert_eq!(res, Ok(()));
                    std_map.insert(key, value);
                }
            }
            Operation::Delete(key) => {
                let res = tree.delete(&key).map(|e| (e.key, e.value));
                prop_assert_eq!(res.ok(), std_map.remove(&key).map(|v| (key, v)));
            }
            Operation::Find(key) => {
                prop_assert_eq!(tree.find(&key).map(|e| e.value), std_map.get(&key).copied());
            }
            Operation::Rotate { key, kind } => {
                // Failed rotations are fine here; the contents must not change either way.
                let _ = match kind {
                    0 => tree.rotate_left(&key),
                    1 => tree.rotate_right(&key),
                    2 => tree.rotate_big_left(&key),
                    _ => tree.rotate_big_right(&key),
                };
            }
        }

        prop_assert_eq!(tree.len(), std_map.len());
        prop_assert_eq!(tree.check_invariant(), Ok(()));
    }

    let elements: Vec<_> = tree.iter().map(|e| (e.key, e.value)).collect();
    let expected: Vec<_> = std_map.into_iter().collect();
    prop_assert_eq!(elements, expected);
}

#[proptest]
fn min_and_max_track_extremes(#[strategy(pvec(any::<i64>(), 1..100))] keys: Vec<i64>) {
    let mut tree = BinarySearchTree::new();
    for key in keys.iter() {
        let _ = tree.insert(Element::new(*key, ()));
    }

    prop_assert_eq!(tree.min().map(|e| e.key), keys.iter().min().copied());
    prop_assert_eq!(tree.max().map(|e| e.key), keys.iter().max().copied());
}

#[proptest]
fn rotations_keep_in_order_sequence(
    #[strategy(pvec(any::<u16>(), 1..60))] keys: Vec<u16>,
    #[strategy(pvec((any::<prop::sample::Index>(), 0..4u8), 1..30))] rotations: Vec<(
        prop::sample::Index,
        u8,
    )>,
) {
    let mut tree = BinarySearchTree::new();
    for key in keys.iter() {
        let _ = tree.insert(Element::new(*key, ()));
    }
    let before: Vec<u16> = tree.keys().copied().collect();

    for (index, kind) in rotations {
        let key = *index.get(&before);
        let res = match kind {
            0 => tree.rotate_left(&key),
            1 => tree.rotate_right(&key),
            2 => tree.rotate_big_left(&key),
            _ => tree.rotate_big_right(&key),
        };
        prop_assert!(!matches!(res, Err(BstError::KeyNotFound)));
    }

    let after: Vec<u16> = tree.keys().copied().collect();
    prop_assert_eq!(after, before);
    prop_assert_eq!(tree.check_invariant(), Ok(()));
}
