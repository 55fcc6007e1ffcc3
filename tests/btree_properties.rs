//! Property-based tests for the B+ tree's structural invariants (§8).

use proptest::prelude::*;
use std::collections::BTreeSet;

use tinysql::btree::BPlusTree;

fn key_for(i: u32) -> String {
    format!("k{i:06}")
}

proptest! {
    /// After any sequence of inserts and removes, `validate()` holds, and the
    /// leaf chain yields exactly the live keys in ascending order.
    #[test]
    fn insert_remove_sequence_preserves_invariants(
        inserts in prop::collection::vec(0u32..200, 1..200),
        removes in prop::collection::vec(0u32..200, 0..100),
    ) {
        let mut tree = BPlusTree::new(4).unwrap();
        let mut live: BTreeSet<u32> = BTreeSet::new();
        for i in &inserts {
            tree.insert(&key_for(*i), *i).unwrap();
            live.insert(*i);
        }
        for i in &removes {
            if live.remove(i) {
                tree.remove(&key_for(*i)).unwrap();
            } else {
                prop_assert!(tree.remove(&key_for(*i)).is_err());
            }
        }

        prop_assert!(tree.validate());

        let chain: Vec<String> = tree.full_scan().into_iter().map(|(k, _)| k).collect();
        let expected: Vec<String> = live.iter().map(|i| key_for(*i)).collect();
        prop_assert_eq!(chain, expected);
    }

    /// `get(k)` returns the last value inserted for `k`, or reports not-found
    /// for a key that was never inserted (or was removed).
    #[test]
    fn get_returns_last_inserted_value(updates in prop::collection::vec((0u32..50, any::<i32>()), 1..200)) {
        let mut tree = BPlusTree::new(4).unwrap();
        let mut model = std::collections::HashMap::new();
        for (key, value) in &updates {
            tree.insert(&key_for(*key), *value).unwrap();
            model.insert(*key, *value);
        }
        for (key, expected) in &model {
            prop_assert_eq!(*tree.get(&key_for(*key)).unwrap(), *expected);
        }
    }

    /// `range(lo, hi)` yields exactly the live keys within `[lo, hi]`, in
    /// ascending order.
    #[test]
    fn range_yields_exactly_the_bounded_live_keys(
        inserts in prop::collection::vec(0u32..100, 1..150),
        lo in 0u32..100,
        span in 0u32..50,
    ) {
        let mut tree = BPlusTree::new(4).unwrap();
        let mut live: BTreeSet<u32> = BTreeSet::new();
        for i in &inserts {
            tree.insert(&key_for(*i), *i).unwrap();
            live.insert(*i);
        }
        let hi = lo + span;
        let result: Vec<String> = tree
            .range(&key_for(lo), &key_for(hi))
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let expected: Vec<String> = live
            .range(lo..=hi)
            .map(|i| key_for(*i))
            .collect();
        prop_assert_eq!(result, expected);
    }

    /// Insert/remove are deterministic: replaying the same sequence of
    /// operations from scratch produces a structurally identical tree.
    #[test]
    fn same_sequence_produces_identical_structure(
        inserts in prop::collection::vec(0u32..80, 1..120),
    ) {
        let build = || {
            let mut tree = BPlusTree::new(4).unwrap();
            for i in &inserts {
                tree.insert(&key_for(*i), *i).unwrap();
            }
            tree.full_scan()
        };
        prop_assert_eq!(build(), build());
    }
}
