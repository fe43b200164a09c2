//! Request and Response models for the reader API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CacheQuery, ChunkedReadRequest, PathQuery, ReadRequest};
pub use responses::{EvictResponse, ErrorResponse, HealthResponse, StatsResponse};
