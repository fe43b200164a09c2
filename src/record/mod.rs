//! Record Module
//!
//! Value conversion and row assembly on top of the parquet record API.

mod row;
mod value;


pub use row::{assemble, columns_of, Column, RowRecord};
pub use value::{to_dynamic, DynamicValue};
