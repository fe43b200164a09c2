//! Row Assembly Module
//!
//! Builds projected row records from a column list and a positional value
//! sequence.

use std::collections::HashSet;
use std::sync::Arc;

use parquet::basic::Type as PhysicalType;
use parquet::record::Field;
use parquet::schema::types::{SchemaDescriptor as ParquetSchema, Type};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::record::{to_dynamic, DynamicValue};

// == Column ==
/// A top-level column of a file: its name and physical storage type.
///
/// `kind` is `None` for nested (group) columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: Option<PhysicalType>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: Option<PhysicalType>) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    fn from_type(field: &Type) -> Self {
        let kind = match field {
            Type::PrimitiveType { physical_type, .. } => Some(*physical_type),
            Type::GroupType { .. } => None,
        };
        Self::new(field.name(), kind)
    }
}

/// Lists the top-level columns of a file schema, in schema order.
pub fn columns_of(schema: &ParquetSchema) -> Arc<[Column]> {
    schema
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| Column::from_type(field))
        .collect()
}

// == Row Record ==
/// One assembled row: column name to value, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, DynamicValue)>,
}

impl RowRecord {
    /// Looks up a value by column name.
    pub fn get(&self, name: &str) -> Option<&DynamicValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// == Assembly ==
/// Builds a [`RowRecord`] from positional `values` aligned with `columns`.
///
/// An absent or empty projection keeps every column. Columns with no value at
/// their position are left out of the record rather than stored as null. Key
/// order always follows `columns`, never the projection.
pub fn assemble(
    columns: &[Column],
    values: &[Field],
    projection: Option<&HashSet<String>>,
) -> RowRecord {
    let projection = projection.filter(|names| !names.is_empty());

    let fields = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| projection.map_or(true, |names| names.contains(&column.name)))
        .filter_map(|(idx, column)| {
            values
                .get(idx)
                .map(|value| (column.name.clone(), to_dynamic(column.kind, value)))
        })
        .collect();

    RowRecord { fields }
}
