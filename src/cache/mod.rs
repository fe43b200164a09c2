//! Cache Module
//!
//! Memoizes full-read results per file path with lazy TTL expiration.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsRecorder};
pub use store::CacheStore;

// == Public Constants ==
/// TTL used when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
