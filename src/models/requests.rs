//! Request DTOs for the reader API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

fn validate_path(path: &str) -> Option<String> {
    if path.trim().is_empty() {
        return Some("Path cannot be empty".to_string());
    }
    None
}

/// Request body for a full read (POST /read)
///
/// `options` stays untyped here; it is parsed by
/// [`ReadOptions::from_value`](crate::reader::ReadOptions::from_value) so
/// numbers may arrive as integers or floats.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadRequest {
    /// File path, relative to the data directory
    pub path: String,
    /// Loose option bag: `columns`, `rowLimit`, `skipRows`
    #[serde(default)]
    pub options: Value,
}

impl ReadRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_path(&self.path)
    }
}

/// Request body for a chunked read (POST /read/chunked)
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkedReadRequest {
    pub path: String,
    /// Rows per chunk; the server default applies when absent
    #[serde(default, rename = "chunkSize")]
    pub chunk_size: Option<usize>,
}

impl ChunkedReadRequest {
    pub fn validate(&self) -> Option<String> {
        validate_path(&self.path)
    }
}

/// Query string naming one file (GET /schema, GET /metadata)
#[derive(Debug, Clone, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

impl PathQuery {
    pub fn validate(&self) -> Option<String> {
        validate_path(&self.path)
    }
}

/// Query string of DELETE /cache; no path clears everything
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheQuery {
    #[serde(default)]
    pub path: Option<String>,
}
