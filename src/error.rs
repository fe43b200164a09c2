//! Error types for the Parquet reader
//!
//! Provides unified error handling using thiserror.

use std::error::Error as StdError;
use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parquet::errors::ParquetError;
use serde_json::json;
use thiserror::Error;

/// Boxed error produced by a caller-supplied chunk handler.
pub type CallbackError = Box<dyn StdError + Send + Sync + 'static>;

// == Reader Error Enum ==
/// Unified error type for reads, inspections and the HTTP boundary.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The file could not be opened or stat'ed
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The bytes are not a readable Parquet file
    #[error("Invalid parquet file {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: ParquetError,
    },

    /// The chunk handler failed; carries the handler's own error
    #[error("Chunk handler failed: {0}")]
    Callback(CallbackError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReaderError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        ReaderError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<String>, source: ParquetError) -> Self {
        ReaderError::Format {
            path: path.into(),
            source,
        }
    }

    /// Returns true for a missing-file I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReaderError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Unwraps the handler error of a `Callback` failure.
    pub fn into_callback_error(self) -> Option<CallbackError> {
        match self {
            ReaderError::Callback(err) => Some(err),
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ReaderError {
    fn into_response(self) -> Response {
        let status = match &self {
            err if err.is_not_found() => StatusCode::NOT_FOUND,
            ReaderError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ReaderError::Format { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ReaderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ReaderError::Callback(_) | ReaderError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the reader.
pub type Result<T> = std::result::Result<T, ReaderError>;
