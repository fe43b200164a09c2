//! Reader Module
//!
//! The session-scoped Parquet reader: cached full reads, chunked streaming
//! reads, and schema/metadata inspection.

mod inspect;
mod options;
mod scan;
mod source;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, StatsRecorder};
use crate::error::{CallbackError, Result};
use crate::record::RowRecord;

pub use inspect::{
    describe_file, describe_schema, FieldDescriptor, FileMetadata, RowGroupInfo,
    SchemaDescriptor, NO_LOGICAL_TYPE,
};
pub use options::ReadOptions;
pub use scan::{collect_rows, stream_chunks, ScanSummary};
pub use source::ParquetSource;

// == Parquet Reader ==
/// Reads Parquet files for one logical session.
///
/// Full reads are memoized per path in a [`CacheStore`]. The cache is keyed
/// by path alone: a hit returns whatever rows the populating read produced,
/// filtered by that read's options, regardless of the options passed now.
/// Callers that need per-option freshness should [`evict`] the path first.
///
/// The reader is meant to be shared (e.g. behind an `Arc`); every method
/// takes `&self` and is safe to call concurrently.
///
/// [`evict`]: ParquetReader::evict
#[derive(Debug, Default)]
pub struct ParquetReader {
    cache: CacheStore,
    stats: StatsRecorder,
}

impl ParquetReader {
    // == Constructor ==
    /// Creates a reader with the default cache TTL of five minutes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader whose cache entries live for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: CacheStore::with_ttl(ttl),
            stats: StatsRecorder::new(),
        }
    }

    // == Read ==
    /// Reads the rows of `path` selected by `options`.
    ///
    /// On a cache hit the cached rows are returned as-is and `options` is
    /// not applied. On a miss the file is scanned once and the filtered
    /// result is cached under `path`.
    pub fn read(
        &self,
        path: impl AsRef<Path>,
        options: &ReadOptions,
    ) -> Result<Arc<[RowRecord]>> {
        let path = path.as_ref();
        let key = cache_key(path);

        if let Some(rows) = self.cache.get(&key) {
            self.stats.record_hit();
            debug!(path = %key, rows = rows.len(), "Cache hit");
            return Ok(rows);
        }
        self.stats.record_miss();

        let started = Instant::now();
        let source = ParquetSource::open(path)?;
        let (rows, summary) = collect_rows(&source, options)?;
        drop(source);

        let rows: Arc<[RowRecord]> = rows.into();
        self.cache.set(key.clone(), Arc::clone(&rows));

        info!(
            path = %key,
            encountered = summary.encountered,
            emitted = summary.emitted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Read parquet file"
        );
        Ok(rows)
    }

    // == Read Chunked ==
    /// Streams every row of `path` to `on_chunk` in chunks of `chunk_size`
    /// rows (a size of 0 counts as 1). Never touches the cache.
    ///
    /// `on_chunk` runs on the calling thread between reads, so a slow handler
    /// slows the scan down. If it fails, no further rows are read and its
    /// error is returned as [`ReaderError::Callback`].
    ///
    /// [`ReaderError::Callback`]: crate::error::ReaderError::Callback
    pub fn read_chunked<F, E>(
        &self,
        path: impl AsRef<Path>,
        chunk_size: usize,
        on_chunk: F,
    ) -> Result<()>
    where
        F: FnMut(Vec<RowRecord>) -> std::result::Result<(), E>,
        E: Into<CallbackError>,
    {
        let path = path.as_ref();
        let source = ParquetSource::open(path)?;

        match stream_chunks(&source, chunk_size, on_chunk) {
            Ok(chunks) => {
                info!(path = %path.display(), chunks, chunk_size, "Streamed parquet file");
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Chunked read aborted");
                Err(err)
            }
        }
    }

    // == Inspect ==
    /// Describes the top-level fields of `path`.
    pub fn schema(&self, path: impl AsRef<Path>) -> Result<SchemaDescriptor> {
        let source = ParquetSource::open(path.as_ref())?;
        Ok(describe_schema(&source))
    }

    /// Summarizes the layout of `path`.
    pub fn metadata(&self, path: impl AsRef<Path>) -> Result<FileMetadata> {
        let source = ParquetSource::open(path.as_ref())?;
        Ok(describe_file(&source))
    }

    // == Cache Control ==
    /// Drops the cached rows for `path`. Returns true if any were stored.
    pub fn evict(&self, path: impl AsRef<Path>) -> bool {
        self.cache.remove(&cache_key(path.as_ref()))
    }

    /// Changes the cache TTL, including for rows cached already.
    pub fn set_cache_ttl(&self, ttl: Duration) {
        self.cache.set_ttl(ttl);
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Hit/miss counters of full reads.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.cache.len())
    }

    // == Close ==
    /// Clears all cached state.
    pub fn close(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        info!(entries = dropped, "Parquet reader closed");
    }
}

fn cache_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use crate::record::DynamicValue;
    use crate::testing::{write_garbage_file, write_people_file};
    use std::path::PathBuf;
    use std::thread::sleep;
    use tempfile::TempDir;

    fn people() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.parquet");
        write_people_file(&path, 2).unwrap();
        (dir, path)
    }

    fn first_id(rows: &[RowRecord]) -> i64 {
        rows[0].get("id").and_then(DynamicValue::as_i64).unwrap()
    }

    #[test]
    fn test_read_populates_cache() {
        let (_dir, path) = people();
        let reader = ParquetReader::new();

        let first = reader.read(&path, &ReadOptions::new()).unwrap();
        let second = reader.read(&path, &ReadOptions::new()).unwrap();

        assert_eq!(first.len(), 5);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = reader.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cache_hit_ignores_new_options() {
        let (_dir, path) = people();
        let reader = ParquetReader::new();

        let limited = reader
            .read(&path, &ReadOptions::new().with_row_limit(2))
            .unwrap();
        let again = reader
            .read(&path, &ReadOptions::new().with_skip_rows(3))
            .unwrap();

        assert_eq!(limited.len(), 2);
        assert_eq!(again.len(), 2);
        assert_eq!(first_id(&again), 1);
    }

    #[test]
    fn test_evict_forces_fresh_read() {
        let (_dir, path) = people();
        let reader = ParquetReader::new();

        reader
            .read(&path, &ReadOptions::new().with_row_limit(2))
            .unwrap();
        assert!(reader.evict(&path));

        let rows = reader
            .read(&path, &ReadOptions::new().with_skip_rows(3))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(first_id(&rows), 4);
    }

    #[test]
    fn test_expired_entry_is_reread() {
        let (_dir, path) = people();
        let reader = ParquetReader::with_ttl(Duration::from_millis(50));

        reader.read(&path, &ReadOptions::new()).unwrap();
        sleep(Duration::from_millis(100));
        reader.read(&path, &ReadOptions::new()).unwrap();

        assert_eq!(reader.stats().misses, 2);
    }

    #[test]
    fn test_close_clears_cache() {
        let (_dir, path) = people();
        let reader = ParquetReader::new();

        reader.read(&path, &ReadOptions::new()).unwrap();
        reader.close();

        assert_eq!(reader.stats().total_entries, 0);
    }

    #[test]
    fn test_read_chunked_bypasses_cache() {
        let (_dir, path) = people();
        let reader = ParquetReader::new();

        let mut total = 0;
        reader
            .read_chunked(&path, 2, |chunk| {
                total += chunk.len();
                Ok::<(), CallbackError>(())
            })
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(reader.stats().total_entries, 0);
    }

    #[test]
    fn test_failed_read_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.parquet");
        write_garbage_file(&path).unwrap();
        let reader = ParquetReader::new();

        let result = reader.read(&path, &ReadOptions::new());

        assert!(matches!(result, Err(ReaderError::Format { .. })));
        assert_eq!(reader.stats().total_entries, 0);
    }
}
