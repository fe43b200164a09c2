//! Parquet Reader - cached row reads over local Parquet files
//!
//! Turns columnar files into schema-ordered row records, with an in-memory
//! TTL cache for full reads, chunked streaming, and schema/metadata
//! inspection. The `api` module exposes the same operations over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod reader;
pub mod record;
pub mod testing;

pub use api::AppState;
pub use config::Config;
pub use error::{ReaderError, Result};
pub use reader::{ParquetReader, ReadOptions};
pub use record::{DynamicValue, RowRecord};
