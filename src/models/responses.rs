//! Response DTOs for the reader API
//!
//! Defines the structure of outgoing HTTP response bodies. Row, schema and
//! metadata bodies serialize the reader's own types directly.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Full reads answered from the cache
    pub hits: u64,
    /// Full reads that opened the file
    pub misses: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    pub message: String,
    /// The evicted path, absent when the whole cache was cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether anything was cached for `path`
    pub removed: bool,
}

impl EvictResponse {
    pub fn evicted(path: impl Into<String>, removed: bool) -> Self {
        let path = path.into();
        let message = if removed {
            format!("Evicted '{}' from cache", path)
        } else {
            format!("'{}' was not cached", path)
        };
        Self {
            message,
            path: Some(path),
            removed,
        }
    }

    pub fn cleared(entries: usize) -> Self {
        Self {
            message: format!("Cleared {} cached entries", entries),
            path: None,
            removed: entries > 0,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
