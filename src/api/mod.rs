//! API Module
//!
//! HTTP handlers and routing for the reader REST API.
//!
//! # Endpoints
//! - `POST /read` - Read rows, cached per path
//! - `POST /read/chunked` - Stream rows as newline-delimited JSON chunks
//! - `GET /schema?path=` - Describe a file's top-level fields
//! - `GET /metadata?path=` - Summarize a file's row groups
//! - `DELETE /cache` - Evict one path (`?path=`) or clear the cache
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
