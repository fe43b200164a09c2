//! API Handlers
//!
//! HTTP request handlers for each reader endpoint. File work runs on the
//! blocking pool; the async side only moves results around.

use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tracing::warn;

use crate::config::Config;
use crate::error::{CallbackError, ReaderError, Result};
use crate::models::{
    CacheQuery, ChunkedReadRequest, ErrorResponse, EvictResponse, HealthResponse, PathQuery,
    ReadRequest, StatsResponse,
};
use crate::reader::{FileMetadata, ParquetReader, ReadOptions, SchemaDescriptor};
use crate::record::RowRecord;

const NDJSON: &str = "application/x-ndjson";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared reader; its cache is the only mutable state
    pub reader: Arc<ParquetReader>,
    /// Root that request paths are resolved against
    pub data_dir: PathBuf,
    /// Rows per chunk when a chunked request names none
    pub default_chunk_size: usize,
    /// Chunks buffered ahead of a slow client
    pub stream_buffer: usize,
}

impl AppState {
    /// Creates a new AppState serving files under `data_dir`.
    pub fn new(reader: ParquetReader, data_dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            reader: Arc::new(reader),
            data_dir: data_dir.into(),
            default_chunk_size: defaults.default_chunk_size,
            stream_buffer: defaults.stream_buffer_chunks,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            reader: Arc::new(ParquetReader::with_ttl(config.cache_ttl())),
            data_dir: config.data_dir.clone(),
            default_chunk_size: config.default_chunk_size.max(1),
            stream_buffer: config.stream_buffer_chunks.max(1),
        }
    }

    /// Maps a request path onto the data directory.
    ///
    /// Only relative paths that stay inside the directory are accepted.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.trim().is_empty() || escapes {
            return Err(ReaderError::InvalidRequest(format!(
                "Path '{}' must be relative to the data directory",
                path
            )));
        }
        Ok(self.data_dir.join(relative))
    }
}

/// Runs file work on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ReaderError::Internal(format!("Reader task failed: {}", e)))?
}

/// Handler for POST /read
///
/// Returns the selected rows as a JSON array. Cached rows are served as-is,
/// whatever options the request carries.
pub async fn read_handler(
    State(state): State<AppState>,
    Json(req): Json<ReadRequest>,
) -> Result<Json<Arc<[RowRecord]>>> {
    if let Some(error_msg) = req.validate() {
        return Err(ReaderError::InvalidRequest(error_msg));
    }
    let options = ReadOptions::from_value(&req.options)?;
    let path = state.resolve(&req.path)?;

    let reader = Arc::clone(&state.reader);
    let rows = blocking(move || reader.read(&path, &options)).await?;

    Ok(Json(rows))
}

/// Handler for POST /read/chunked
///
/// Streams every row as newline-delimited JSON, one array per chunk. The scan
/// runs at most `stream_buffer` chunks ahead of the client and stops once the
/// client goes away. A failure before the first chunk is an error status; a
/// later one ends the stream with an `{"error": ...}` line.
pub async fn read_chunked_handler(
    State(state): State<AppState>,
    Json(req): Json<ChunkedReadRequest>,
) -> Result<Response> {
    if let Some(error_msg) = req.validate() {
        return Err(ReaderError::InvalidRequest(error_msg));
    }
    let path = state.resolve(&req.path)?;
    let chunk_size = req.chunk_size.unwrap_or(state.default_chunk_size);

    let (tx, rx) = mpsc::channel::<Result<String>>(state.stream_buffer.max(1));
    let reader = Arc::clone(&state.reader);
    let task_tx = tx.clone();

    let task = tokio::task::spawn_blocking(move || {
        if let Err(err) = send_chunks(&reader, &path, chunk_size, &task_tx) {
            // Nobody is listening if the client left.
            let _ = task_tx.blocking_send(Err(err));
        }
    });
    tokio::spawn(report_panic(task, tx));

    let mut results = ReceiverStream::new(rx);
    let head = match results.next().await {
        Some(Err(err)) => return Err(err),
        head => head,
    };

    let lines = ndjson_lines(tokio_stream::iter(head).chain(results));
    Ok(([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(lines)).into_response())
}

/// Runs a chunked read, sending each chunk to `tx` as one NDJSON line.
///
/// Blocks while `tx` is full. Fails with a callback error once the receiving
/// side is gone.
fn send_chunks(
    reader: &ParquetReader,
    path: &Path,
    chunk_size: usize,
    tx: &mpsc::Sender<Result<String>>,
) -> Result<()> {
    let send = |chunk: Vec<RowRecord>| -> std::result::Result<(), CallbackError> {
        let mut line = serde_json::to_string(&chunk)?;
        line.push('\n');
        tx.blocking_send(Ok(line))
            .map_err(|_| CallbackError::from("client disconnected"))
    };
    reader.read_chunked(path, chunk_size, send)
}

/// Forwards a panic of the reader task as a final stream item.
async fn report_panic(task: JoinHandle<()>, tx: mpsc::Sender<Result<String>>) {
    if let Err(err) = task.await {
        warn!(error = %err, "Chunked reader task failed");
        let failure = ReaderError::Internal(format!("Reader task failed: {}", err));
        let _ = tx.send(Err(failure)).await;
    }
}

/// Renders scan results as response lines; a failure becomes an error line.
fn ndjson_lines<S>(
    results: S,
) -> impl Stream<Item = std::result::Result<String, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<String>> + Send + 'static,
{
    results.map(|item| -> std::result::Result<String, Infallible> {
        Ok(match item {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "Chunked read failed mid-stream");
                error_line(&err)
            }
        })
    })
}

fn error_line(err: &ReaderError) -> String {
    let mut line = serde_json::to_string(&ErrorResponse::new(err.to_string())).unwrap_or_default();
    line.push('\n');
    line
}

/// Handler for GET /schema?path=
pub async fn schema_handler(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<SchemaDescriptor>> {
    if let Some(error_msg) = query.validate() {
        return Err(ReaderError::InvalidRequest(error_msg));
    }
    let path = state.resolve(&query.path)?;

    let reader = Arc::clone(&state.reader);
    let schema = blocking(move || reader.schema(&path)).await?;

    Ok(Json(schema))
}

/// Handler for GET /metadata?path=
pub async fn metadata_handler(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<FileMetadata>> {
    if let Some(error_msg) = query.validate() {
        return Err(ReaderError::InvalidRequest(error_msg));
    }
    let path = state.resolve(&query.path)?;

    let reader = Arc::clone(&state.reader);
    let metadata = blocking(move || reader.metadata(&path)).await?;

    Ok(Json(metadata))
}

/// Handler for DELETE /cache
///
/// Evicts one path, or clears the whole cache when no path is given.
pub async fn evict_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<EvictResponse>> {
    match query.path {
        Some(path) => {
            let resolved = state.resolve(&path)?;
            let removed = state.reader.evict(&resolved);
            Ok(Json(EvictResponse::evicted(path, removed)))
        }
        None => {
            let entries = state.reader.stats().total_entries;
            state.reader.close();
            Ok(Json(EvictResponse::cleared(entries)))
        }
    }
}

/// Handler for GET /stats
///
/// Returns full-read cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.reader.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
