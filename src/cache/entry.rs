//! Cache Entry Module
//!
//! Defines a cached full-read result and its freshness check.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::record::RowRecord;

// == Cache Entry ==
/// A cached full-read result for one file path.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The rows returned by the read that populated this entry
    pub rows: Arc<[RowRecord]>,
    /// Monotonic creation time
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(rows: Arc<[RowRecord]>) -> Self {
        Self {
            rows,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was stored.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Is Expired ==
    /// Checks the entry against `ttl`.
    ///
    /// An entry stays valid while its age is at most `ttl`; it expires once
    /// the age strictly exceeds it. The TTL is passed in rather than stored so
    /// a changed TTL applies to entries that already exist.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn empty_rows() -> Arc<[RowRecord]> {
        Arc::from(Vec::new())
    }

    #[test]
    fn test_entry_fresh_within_ttl() {
        let entry = CacheEntry::new(empty_rows());
        assert!(!entry.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(empty_rows());

        sleep(Duration::from_millis(100));

        assert!(entry.is_expired(Duration::from_millis(50)));
        assert!(!entry.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let created_at = Instant::now();
        let entry = CacheEntry {
            rows: empty_rows(),
            created_at,
        };

        // A zero TTL expires as soon as any time has passed
        sleep(Duration::from_millis(2));
        assert!(entry.is_expired(Duration::ZERO));
    }
}
