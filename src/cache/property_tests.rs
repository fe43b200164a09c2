//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::record::RowRecord;

// == Strategies ==
/// Generates file-path-like keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_/]{1,32}\\.parquet".prop_map(|s| s)
}

/// Generates row counts for cached results
fn row_count_strategy() -> impl Strategy<Value = usize> {
    0usize..16
}

fn rows(n: usize) -> Arc<[RowRecord]> {
    vec![RowRecord::default(); n].into()
}

/// A sequence of cache operations for model testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, rows: usize },
    Get { key: String },
    Remove { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (valid_key_strategy(), row_count_strategy())
            .prop_map(|(key, rows)| CacheOp::Set { key, rows }),
        4 => valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => valid_key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Before expiry the store behaves exactly like a map.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = CacheStore::new();
        let mut model: HashMap<String, usize> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, rows: n } => {
                    store.set(key.clone(), rows(n));
                    model.insert(key, n);
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key).map(|rows| rows.len());
                    prop_assert_eq!(got, model.get(&key).copied());
                }
                CacheOp::Remove { key } => {
                    let removed = store.remove(&key);
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
                CacheOp::Clear => {
                    store.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(store.len(), model.len());
        }
    }

    // Storing then reading returns the same rows.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), n in row_count_strategy()) {
        let store = CacheStore::new();
        let stored = rows(n);

        store.set(key.clone(), Arc::clone(&stored));

        let retrieved = store.get(&key).unwrap();
        prop_assert!(Arc::ptr_eq(&retrieved, &stored));
    }

    // Overwriting keeps a single entry holding the latest rows.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        first in row_count_strategy(),
        second in row_count_strategy()
    ) {
        let store = CacheStore::new();

        store.set(key.clone(), rows(first));
        store.set(key.clone(), rows(second));

        prop_assert_eq!(store.get(&key).unwrap().len(), second);
        prop_assert_eq!(store.len(), 1);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once the TTL has elapsed a lookup misses, though nothing removed the entry.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), n in row_count_strategy()) {
        let store = CacheStore::with_ttl(Duration::from_millis(50));

        store.set(key.clone(), rows(n));
        prop_assert!(store.get(&key).is_some(), "Entry should exist before TTL expires");

        sleep(Duration::from_millis(100));

        prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
        prop_assert_eq!(store.len(), 1);
    }
}
