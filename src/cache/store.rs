//! Cache Store Module
//!
//! Path-keyed store of full-read results with lazy TTL expiry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::cache::{CacheEntry, DEFAULT_TTL};
use crate::record::RowRecord;

#[derive(Debug)]
struct Inner {
    /// Path-keyed storage
    entries: HashMap<String, CacheEntry>,
    /// TTL applied at lookup time
    ttl: Duration,
}

// == Cache Store ==
/// Concurrent path → rows cache.
///
/// Lookups take a shared lock and never modify the store, so any number of
/// them run in parallel. `set`, `remove`, `clear` and `set_ttl` take the
/// exclusive lock. Expired entries are not swept; they are simply reported
/// as missing until overwritten or removed.
#[derive(Debug)]
pub struct CacheStore {
    inner: RwLock<Inner>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with the default TTL of five minutes.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates an empty store with the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                ttl,
            }),
        }
    }

    // A panicking writer can't leave the map half-updated, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns the rows stored under `key` if present and not expired.
    pub fn get(&self, key: &str) -> Option<Arc<[RowRecord]>> {
        let inner = self.read();
        let entry = inner.entries.get(key)?;

        if entry.is_expired(inner.ttl) {
            return None;
        }

        Some(Arc::clone(&entry.rows))
    }

    // == Set ==
    /// Stores `rows` under `key`, replacing any previous entry and resetting
    /// its creation time.
    pub fn set(&self, key: impl Into<String>, rows: Arc<[RowRecord]>) {
        let mut inner = self.write();
        inner.entries.insert(key.into(), CacheEntry::new(rows));
    }

    // == Remove ==
    /// Removes the entry for `key`. Returns true if one was stored.
    pub fn remove(&self, key: &str) -> bool {
        self.write().entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.write().entries.clear();
    }

    // == TTL ==
    /// Changes the TTL used by every later lookup, including lookups of
    /// entries stored before the change.
    pub fn set_ttl(&self, ttl: Duration) {
        self.write().ttl = ttl;
    }

    pub fn ttl(&self) -> Duration {
        self.read().ttl
    }

    // == Length ==
    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::{self, sleep};

    fn rows(n: usize) -> Arc<[RowRecord]> {
        vec![RowRecord::default(); n].into()
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_store_set_and_get() {
        let store = CacheStore::new();

        store.set("a.parquet", rows(3));
        let value = store.get("a.parquet").unwrap();

        assert_eq!(value.len(), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = CacheStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_remove_only_touches_key() {
        let store = CacheStore::new();

        store.set("a.parquet", rows(1));
        store.set("b.parquet", rows(2));
        assert!(store.remove("a.parquet"));

        assert!(store.get("a.parquet").is_none());
        assert_eq!(store.get("b.parquet").unwrap().len(), 2);
        assert!(!store.remove("a.parquet"));
    }

    #[test]
    fn test_store_clear() {
        let store = CacheStore::new();

        store.set("a.parquet", rows(1));
        store.set("b.parquet", rows(1));
        store.clear();

        assert!(store.is_empty());
        assert!(store.get("a.parquet").is_none());
        assert!(store.get("b.parquet").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let store = CacheStore::new();

        store.set("a.parquet", rows(1));
        store.set("a.parquet", rows(4));

        assert_eq!(store.get("a.parquet").unwrap().len(), 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = CacheStore::with_ttl(Duration::from_millis(50));

        store.set("a.parquet", rows(1));
        assert!(store.get("a.parquet").is_some());

        sleep(Duration::from_millis(100));

        // Expired but never removed
        assert!(store.get("a.parquet").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_ttl_applies_to_existing_entries() {
        let store = CacheStore::new();

        store.set("a.parquet", rows(1));
        sleep(Duration::from_millis(60));
        assert!(store.get("a.parquet").is_some());

        store.set_ttl(Duration::from_millis(50));
        assert!(store.get("a.parquet").is_none());

        store.set_ttl(Duration::from_secs(60));
        assert!(store.get("a.parquet").is_some());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(CacheStore::new());
        store.set("shared.parquet", rows(5));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..100 {
                        if i % 2 == 0 {
                            let hit = store.get("shared.parquet").unwrap();
                            assert_eq!(hit.len(), 5);
                        } else {
                            store.set(format!("file-{i}-{j}.parquet"), rows(1));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1 + 4 * 100);
    }
}
