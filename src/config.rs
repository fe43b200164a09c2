//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime of cached full reads, in milliseconds
    pub cache_ttl_ms: u64,
    /// Directory request paths are resolved against
    pub data_dir: PathBuf,
    /// Rows per chunk when a chunked request names no size
    pub default_chunk_size: usize,
    /// Chunks buffered between the file scan and a slow HTTP client
    pub stream_buffer_chunks: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL_MS` - Cache entry lifetime in milliseconds (default: 300000)
    /// - `DATA_DIR` - Root directory for request paths (default: `.`)
    /// - `DEFAULT_CHUNK_SIZE` - Rows per streamed chunk (default: 1000)
    /// - `STREAM_BUFFER_CHUNKS` - Streaming backpressure buffer (default: 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            data_dir: env::var_os("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            default_chunk_size: parse_var("DEFAULT_CHUNK_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.default_chunk_size),
            stream_buffer_chunks: parse_var("STREAM_BUFFER_CHUNKS")
                .filter(|chunks| *chunks > 0)
                .unwrap_or(defaults.stream_buffer_chunks),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl_ms: 300_000,
            data_dir: PathBuf::from("."),
            default_chunk_size: 1000,
            stream_buffer_chunks: 4,
        }
    }
}
