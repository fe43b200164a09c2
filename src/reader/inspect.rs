//! Inspection Module
//!
//! Schema and file-level metadata descriptors, rebuilt from the footer on
//! every call.

use parquet::basic::{ConvertedType, LogicalType, Repetition};
use parquet::schema::types::Type;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::reader::ParquetSource;

/// Logical type name reported when a field carries no annotation.
pub const NO_LOGICAL_TYPE: &str = "none";

// == Field Descriptor ==
/// Description of one top-level schema field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldDescriptor {
    #[serde(skip)]
    pub name: String,
    /// Physical type name, or `group` for nested fields
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
    pub repeated: bool,
    /// Logical annotation, or `"none"`
    #[serde(rename = "logical")]
    pub logical_type: String,
}

impl FieldDescriptor {
    fn from_type(field: &Type) -> Self {
        let info = field.get_basic_info();
        let repetition = info.has_repetition().then(|| info.repetition());

        let type_name = match field {
            Type::PrimitiveType { physical_type, .. } => physical_type.to_string(),
            Type::GroupType { .. } => "group".to_string(),
        };

        let logical_type = match info.logical_type_ref() {
            Some(logical) => logical_type_name(logical),
            None if info.converted_type() != ConvertedType::NONE => {
                info.converted_type().to_string()
            }
            None => NO_LOGICAL_TYPE.to_string(),
        };

        Self {
            name: field.name().to_string(),
            type_name,
            optional: repetition == Some(Repetition::OPTIONAL),
            repeated: repetition == Some(Repetition::REPEATED),
            logical_type,
        }
    }
}

fn logical_type_name(logical: &LogicalType) -> String {
    match logical {
        LogicalType::String => "STRING".to_string(),
        LogicalType::Map => "MAP".to_string(),
        LogicalType::List => "LIST".to_string(),
        LogicalType::Enum => "ENUM".to_string(),
        LogicalType::Date => "DATE".to_string(),
        LogicalType::Json => "JSON".to_string(),
        LogicalType::Bson => "BSON".to_string(),
        LogicalType::Uuid => "UUID".to_string(),
        LogicalType::Float16 => "FLOAT16".to_string(),
        LogicalType::Decimal { scale, precision } => format!("DECIMAL({},{})", precision, scale),
        LogicalType::Integer {
            bit_width,
            is_signed,
        } => format!("INT({},{})", bit_width, is_signed),
        other => format!("{:?}", other),
    }
}

// == Schema Descriptor ==
/// Top-level fields of a file, in schema order.
///
/// Serializes as an object keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SchemaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, field)?;
        }
        map.end()
    }
}

// == File Metadata ==
/// One row group's footprint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowGroupInfo {
    pub index: usize,
    pub num_rows: i64,
    /// Column chunks in the group (one per leaf column)
    pub num_columns: usize,
}

/// File-level summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub num_rows: i64,
    pub num_row_groups: usize,
    /// Top-level schema fields
    pub num_columns: usize,
    /// File length in bytes
    #[serde(rename = "size")]
    pub byte_size: u64,
    pub row_groups: Vec<RowGroupInfo>,
    pub schema: SchemaDescriptor,
}

// == Describe ==
pub fn describe_schema(source: &ParquetSource) -> SchemaDescriptor {
    let fields = source
        .schema()
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| FieldDescriptor::from_type(field))
        .collect();

    SchemaDescriptor { fields }
}

pub fn describe_file(source: &ParquetSource) -> FileMetadata {
    let meta = source.metadata();
    let schema = describe_schema(source);

    let row_groups = meta
        .row_groups()
        .iter()
        .enumerate()
        .map(|(index, group)| RowGroupInfo {
            index,
            num_rows: group.num_rows(),
            num_columns: group.num_columns(),
        })
        .collect();

    FileMetadata {
        num_rows: meta.file_metadata().num_rows(),
        num_row_groups: meta.num_row_groups(),
        num_columns: schema.len(),
        byte_size: source.byte_size(),
        row_groups,
        schema,
    }
}
