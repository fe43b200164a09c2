//! Read Options Module
//!
//! Typed read options plus parsing of the loose JSON option bag accepted at
//! the boundary.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{ReaderError, Result};

// == Read Options ==
/// Options for a full read.
///
/// Both numeric fields are already normalized: `row_limit` is `None` when
/// unbounded and `skip_rows` is never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Columns to keep; `None` or an empty set keeps every column
    pub columns: Option<HashSet<String>>,
    /// Maximum number of rows to return
    pub row_limit: Option<usize>,
    /// Number of leading rows to discard
    pub skip_rows: usize,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the row limit; zero or negative means unbounded.
    pub fn with_row_limit(mut self, limit: i64) -> Self {
        self.row_limit = usize::try_from(limit).ok().filter(|limit| *limit > 0);
        self
    }

    /// Sets the number of rows to skip; negative values count as zero.
    pub fn with_skip_rows(mut self, skip: i64) -> Self {
        self.skip_rows = usize::try_from(skip).unwrap_or(0);
        self
    }

    // == From Value ==
    /// Parses a loosely typed option bag.
    ///
    /// Recognized keys are `columns` (array of strings), `rowLimit` and
    /// `skipRows` (numbers, integer or floating point, truncated toward zero).
    /// Non-string column names are ignored, as are unknown keys. `null` or a
    /// missing bag yields the defaults.
    pub fn from_value(value: &Value) -> Result<Self> {
        let bag = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(bag) => bag,
            other => {
                return Err(ReaderError::InvalidRequest(format!(
                    "options must be an object, got {}",
                    other
                )))
            }
        };

        let mut options = Self::default();

        match bag.get("columns") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                options.columns = Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                );
            }
            Some(other) => {
                return Err(ReaderError::InvalidRequest(format!(
                    "`columns` must be an array of strings, got {}",
                    other
                )))
            }
        }

        if let Some(limit) = integer_option(bag.get("rowLimit"), "rowLimit")? {
            options = options.with_row_limit(limit);
        }
        if let Some(skip) = integer_option(bag.get("skipRows"), "skipRows")? {
            options = options.with_skip_rows(skip);
        }

        Ok(options)
    }
}

/// Normalizes an integer or floating-point JSON number to `i64`.
fn integer_option(value: Option<&Value>, key: &str) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            // `as` saturates out-of-range floats
            let int = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64));
            Ok(int)
        }
        Some(other) => Err(ReaderError::InvalidRequest(format!(
            "`{}` must be a number, got {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_bag_is_default() {
        let options = ReadOptions::from_value(&Value::Null).unwrap();
        assert_eq!(options, ReadOptions::default());
    }

    #[test]
    fn test_full_bag() {
        let options = ReadOptions::from_value(&json!({
            "columns": ["id", "name"],
            "rowLimit": 2,
            "skipRows": 1
        }))
        .unwrap();

        assert_eq!(options.row_limit, Some(2));
        assert_eq!(options.skip_rows, 1);
        let columns = options.columns.unwrap();
        assert_eq!(columns.len(), 2);
        assert!(columns.contains("id"));
        assert!(columns.contains("name"));
    }

    #[test]
    fn test_float_numbers_are_truncated() {
        let options = ReadOptions::from_value(&json!({
            "rowLimit": 2.9,
            "skipRows": 1.5
        }))
        .unwrap();

        assert_eq!(options.row_limit, Some(2));
        assert_eq!(options.skip_rows, 1);
    }

    #[test]
    fn test_non_positive_limit_is_unbounded() {
        let zero = ReadOptions::from_value(&json!({ "rowLimit": 0 })).unwrap();
        assert_eq!(zero.row_limit, None);

        let negative = ReadOptions::from_value(&json!({ "rowLimit": -1 })).unwrap();
        assert_eq!(negative.row_limit, None);
    }

    #[test]
    fn test_negative_skip_is_zero() {
        let options = ReadOptions::from_value(&json!({ "skipRows": -3 })).unwrap();
        assert_eq!(options.skip_rows, 0);
    }

    #[test]
    fn test_non_string_columns_are_ignored() {
        let options = ReadOptions::from_value(&json!({ "columns": ["id", 7, null] })).unwrap();
        let columns = options.columns.unwrap();
        assert_eq!(columns.len(), 1);
        assert!(columns.contains("id"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let options = ReadOptions::from_value(&json!({ "bufferSize": 1000 })).unwrap();
        assert_eq!(options, ReadOptions::default());
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(ReadOptions::from_value(&json!(["id"])).is_err());
        assert!(ReadOptions::from_value(&json!({ "columns": "id" })).is_err());
        assert!(ReadOptions::from_value(&json!({ "rowLimit": "10" })).is_err());
    }

    #[test]
    fn test_builder() {
        let options = ReadOptions::new()
            .with_columns(["id"])
            .with_row_limit(5)
            .with_skip_rows(2);

        assert_eq!(options.row_limit, Some(5));
        assert_eq!(options.skip_rows, 2);
        assert!(options.columns.unwrap().contains("id"));
    }
}
