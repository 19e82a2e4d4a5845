use super::{BTree, BTreeError};
use proptest::collection::btree_set as pset;
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use std::collections::{BTreeMap as StdBTreeMap, BTreeSet};
use test_strategy::proptest;

#[derive(Debug, Clone)]
enum Operation {
    Add { key: u16, value: u32 },
    Search(u16),
    Remove(usize),
    Iter { from: usize, len: usize },
}

// A custom strategy that gives unequal weights to the different operations.
// Note that `Add` has a higher weight than `Remove` so that, on average, trees
// are growing in size the more operations are executed.
fn op_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0..2_000u16, any::<u32>()).prop_map(|(key, value)| Operation::Add { key, value }),
        1 => (0..2_000u16).prop_map(Operation::Search),
        2 => any::<usize>().prop_map(Operation::Remove),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(from, len)| Operation::Iter { from, len }),
    ]
}

fn order_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(2), Just(4), Just(6)]
}

// Runs a comprehensive test for the major B-tree operations.
// Results are validated against a standard BTreeMap.
#[proptest(cases = 32)]
fn comprehensive(
    #[strategy(order_strategy())] order: usize,
    #[strategy(pvec(op_strategy(), 100..2_000))] ops: Vec<Operation>,
) {
    let mut tree = BTree::new(order).unwrap();
    let mut std_map = StdBTreeMap::new();

    for op in ops.into_iter() {
        execute_operation(&mut std_map, &mut tree, op);
    }
}

#[proptest(cases = 16)]
fn add_then_remove_all(
    #[strategy(order_strategy())] order: usize,
    #[strategy(pset(any::<i32>(), 1..1_000))] keys: BTreeSet<i32>,
) {
    let mut tree = BTree::new(order).unwrap();
    for key in keys.iter() {
        prop_assert_eq!(tree.add(*key, key.wrapping_mul(3)), Ok(()));
    }
    prop_assert_eq!(tree.len(), keys.len());

    for key in keys.iter() {
        let expected = key.wrapping_mul(3);
        prop_assert_eq!(tree.search(key), Ok(Some(&expected)));
    }

    let group_sizes: usize = tree.keys_in_nodes().iter().map(Vec::len).sum();
    prop_assert_eq!(group_sizes, keys.len());

    for key in keys.iter() {
        prop_assert_eq!(tree.remove(key), Ok(key.wrapping_mul(3)));
        prop_assert!(!tree.contains_key(key));
    }
    prop_assert_eq!(tree.search(&0), Err(BTreeError::EmptyState));
}

#[proptest]
fn tree_min_max(#[strategy(pvec(any::<u64>(), 10..100))] keys: Vec<u64>) {
    let mut tree = BTree::new(2).unwrap();
    prop_assert_eq!(tree.first_key_value(), None);
    prop_assert_eq!(tree.last_key_value(), None);

    for (n, key) in keys.iter().enumerate() {
        let _ = tree.add(*key, *key);

        let min = keys[0..=n].iter().min().unwrap();
        let max = keys[0..=n].iter().max().unwrap();

        prop_assert_eq!(tree.first_key_value(), Some((min, min)));
        prop_assert_eq!(tree.last_key_value(), Some((max, max)));
    }
}

#[proptest]
fn occupancy_stays_within_bounds(
    #[strategy(order_strategy())] order: usize,
    #[strategy(pvec(any::<u8>(), 1..300))] keys: Vec<u8>,
    #[strategy(pvec(any::<u8>(), 0..300))] removals: Vec<u8>,
) {
    let mut tree = BTree::new(order).unwrap();
    for key in keys {
        let _ = tree.add(key, ());
    }
    for key in removals {
        let _ = tree.remove(&key);

        let groups = tree.keys_in_nodes();
        for (i, group) in groups.iter().enumerate() {
            let min = if i == 0 { 1 } else { order };
            prop_assert!(group.len() >= min && group.len() <= 2 * order);
        }
    }
}

fn execute_operation(
    std_map: &mut StdBTreeMap<u16, u32>,
    tree: &mut BTree<u16, u32>,
    op: Operation,
) {
    match op {
        Operation::Add { key, value } => {
            let res = tree.add(key, value);
            if std_map.contains_key(&key) {
                assert_eq!(res, Err(BTreeError::DuplicateKey));
            } else {
                assert_eq!(res, Ok(()));
                std_map.insert(key, value);
            }
        }
        Operation::Search(key) => {
            let res = tree.search(&key);
            if std_map.is_empty() {
                assert_eq!(res, Err(BTreeError::EmptyState));
            } else {
                assert_eq!(res, Ok(std_map.get(&key)));
            }
        }
        Operation::Remove(idx) => {
            assert_eq!(std_map.len(), tree.len());
            if std_map.is_empty() {
                assert_eq!(tree.remove(&0), Err(BTreeError::EmptyState));
                return;
            }

            let idx = idx % std_map.len();
            let key = *std_map.keys().nth(idx).unwrap();
            assert_eq!(tree.remove(&key), Ok(std_map.remove(&key).unwrap()));
            assert!(!tree.contains_key(&key));
        }
        Operation::Iter { from, len } => {
            assert_eq!(std_map.len(), tree.len());
            if std_map.is_empty() {
                return;
            }

            let from = from % std_map.len();
            let len = len % std_map.len();

            let std_iter = std_map.iter().skip(from).take(len);
            let iter = tree.iter().skip(from).take(len);
            for ((k1, v1), (k2, v2)) in std_iter.zip(iter) {
                assert_eq!(k1, k2);
                assert_eq!(v1, v2);
            }
        }
    };
}
