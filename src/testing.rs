//! Test fixtures.
//!
//! Small Parquet files written with the low-level column writer API, used by
//! the unit and integration tests. Row group boundaries are explicit so tests
//! can exercise multi-group scans.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parquet::data_type::{
    BoolType, ByteArray, ByteArrayType, DoubleType, FixedLenByteArray, FixedLenByteArrayType,
    Int32Type, Int64Type,
};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use parquet::schema::types::Type;

const PEOPLE_SCHEMA: &str = "
message people {
    REQUIRED INT64 id;
    REQUIRED BYTE_ARRAY name (STRING);
    REQUIRED BOOLEAN active;
    REQUIRED DOUBLE score;
    OPTIONAL INT32 age;
    OPTIONAL BYTE_ARRAY metadata;
}
";

const SEQUENCE_SCHEMA: &str = "
message sequence {
    REQUIRED INT64 id;
    REQUIRED DOUBLE value;
    REQUIRED BYTE_ARRAY label (STRING);
}
";

const SPANS_SCHEMA: &str = "
message spans {
    REQUIRED INT64 id;
    OPTIONAL FIXED_LEN_BYTE_ARRAY (12) span (INTERVAL);
    REQUIRED BYTE_ARRAY label (UTF8);
}
";

const SPAN_ONLY_SCHEMA: &str = "
message span_only {
    REQUIRED FIXED_LEN_BYTE_ARRAY (12) span (INTERVAL);
}
";

const NESTED_SPAN_SCHEMA: &str = "
message nested_span {
    REQUIRED INT64 id;
    OPTIONAL group extra {
        REQUIRED FIXED_LEN_BYTE_ARRAY (12) span (INTERVAL);
    }
}
";

const DECIMALS_SCHEMA: &str = "
message decimals {
    REQUIRED INT32 price (DECIMAL(9,2));
    REQUIRED INT64 total (DECIMAL(18,4));
}
";

/// Rows of [`write_spans_file`]: id, optional INTERVAL span, label.
pub const SPANS: [(i64, Option<(u32, u32, u32)>, &str); 3] = [
    (1, Some((1, 2, 1000)), "first"),
    (2, None, "second"),
    (3, Some((0, 30, 0)), "third"),
];

/// Encodes an INTERVAL value: little-endian months, days, milliseconds.
pub fn interval_bytes(months: u32, days: u32, millis: u32) -> Vec<u8> {
    [months, days, millis]
        .iter()
        .flat_map(|part| part.to_le_bytes())
        .collect()
}

fn interval(parts: (u32, u32, u32)) -> FixedLenByteArray {
    ByteArray::from(interval_bytes(parts.0, parts.1, parts.2)).into()
}

/// One row of the people fixture.
#[derive(Debug, Clone, Copy)]
pub struct Person {
    pub id: i64,
    pub name: &'static str,
    pub active: bool,
    pub score: f64,
    pub age: Option<i32>,
    pub metadata: Option<&'static str>,
}

/// The five rows of [`write_people_file`], in storage order.
#[rustfmt::skip]
pub const PEOPLE: [Person; 5] = [
    Person { id: 1, name: "Alice", active: true, score: 95.5, age: Some(30), metadata: Some("test1") },
    Person { id: 2, name: "Bob", active: false, score: 87.3, age: Some(25), metadata: Some("test2") },
    Person { id: 3, name: "Charlie", active: true, score: 92.1, age: Some(35), metadata: Some("test3") },
    Person { id: 4, name: "David", active: false, score: 78.9, age: Some(28), metadata: None },
    Person { id: 5, name: "Eve", active: true, score: 88.7, age: Some(32), metadata: Some("test5") },
];

fn create_writer(path: &Path, schema: &str) -> Result<SerializedFileWriter<File>> {
    let schema: Arc<Type> = Arc::new(parse_message_type(schema).context("parse fixture schema")?);
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    SerializedFileWriter::new(file, schema, props).context("create SerializedFileWriter")
}

/// Definition levels for an optional column plus its non-null values.
fn optional<T>(values: impl Iterator<Item = Option<T>>) -> (Vec<T>, Vec<i16>) {
    let mut present = Vec::new();
    let mut levels = Vec::new();
    for value in values {
        match value {
            Some(v) => {
                present.push(v);
                levels.push(1);
            }
            None => levels.push(0),
        }
    }
    (present, levels)
}

/// Writes the five [`PEOPLE`] rows with at most `rows_per_group` rows per
/// row group.
pub fn write_people_file(path: &Path, rows_per_group: usize) -> Result<()> {
    let mut writer = create_writer(path, PEOPLE_SCHEMA)?;

    for rows in PEOPLE.chunks(rows_per_group.max(1)) {
        let mut group = writer.next_row_group().context("start row group")?;
        let mut index = 0;

        while let Some(mut column) = group.next_column().context("next column")? {
            match index {
                0 => {
                    let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
                    column.typed::<Int64Type>().write_batch(&ids, None, None)?;
                }
                1 => {
                    let names: Vec<ByteArray> =
                        rows.iter().map(|p| ByteArray::from(p.name)).collect();
                    column.typed::<ByteArrayType>().write_batch(&names, None, None)?;
                }
                2 => {
                    let active: Vec<bool> = rows.iter().map(|p| p.active).collect();
                    column.typed::<BoolType>().write_batch(&active, None, None)?;
                }
                3 => {
                    let scores: Vec<f64> = rows.iter().map(|p| p.score).collect();
                    column.typed::<DoubleType>().write_batch(&scores, None, None)?;
                }
                4 => {
                    let (ages, levels) = optional(rows.iter().map(|p| p.age));
                    column
                        .typed::<Int32Type>()
                        .write_batch(&ages, Some(levels.as_slice()), None)?;
                }
                _ => {
                    let (meta, levels) =
                        optional(rows.iter().map(|p| p.metadata.map(ByteArray::from)));
                    column
                        .typed::<ByteArrayType>()
                        .write_batch(&meta, Some(levels.as_slice()), None)?;
                }
            }
            column.close().context("close column")?;
            index += 1;
        }
        group.close().context("close row group")?;
    }

    writer.close().context("close writer")?;
    Ok(())
}

/// Writes `num_rows` rows of `(id, value, label)` with ids counting from 0,
/// at most `rows_per_group` rows per row group.
pub fn write_sequence_file(path: &Path, num_rows: usize, rows_per_group: usize) -> Result<()> {
    let mut writer = create_writer(path, SEQUENCE_SCHEMA)?;
    let ids: Vec<i64> = (0..num_rows as i64).collect();

    for chunk in ids.chunks(rows_per_group.max(1)) {
        let mut group = writer.next_row_group().context("start row group")?;
        let mut index = 0;

        while let Some(mut column) = group.next_column().context("next column")? {
            match index {
                0 => {
                    column.typed::<Int64Type>().write_batch(chunk, None, None)?;
                }
                1 => {
                    let values: Vec<f64> = chunk.iter().map(|id| *id as f64 * 0.5).collect();
                    column.typed::<DoubleType>().write_batch(&values, None, None)?;
                }
                _ => {
                    let labels: Vec<ByteArray> = chunk
                        .iter()
                        .map(|id| ByteArray::from(format!("row-{}", id).as_str()))
                        .collect();
                    column.typed::<ByteArrayType>().write_batch(&labels, None, None)?;
                }
            }
            column.close().context("close column")?;
            index += 1;
        }
        group.close().context("close row group")?;
    }

    writer.close().context("close writer")?;
    Ok(())
}

/// Writes bytes that are not a Parquet file.
pub fn write_garbage_file(path: &Path) -> Result<()> {
    std::fs::write(path, b"this is definitely not a parquet file")
        .with_context(|| format!("write {}", path.display()))
}

/// Writes the [`SPANS`] rows in one row group. The `span` column carries the
/// INTERVAL annotation.
pub fn write_spans_file(path: &Path) -> Result<()> {
    let mut writer = create_writer(path, SPANS_SCHEMA)?;
    let mut group = writer.next_row_group().context("start row group")?;
    let mut index = 0;

    while let Some(mut column) = group.next_column().context("next column")? {
        match index {
            0 => {
                let ids: Vec<i64> = SPANS.iter().map(|(id, _, _)| *id).collect();
                column.typed::<Int64Type>().write_batch(&ids, None, None)?;
            }
            1 => {
                let spans = SPANS.iter().map(|(_, span, _)| span.map(interval));
                let (spans, levels) = optional(spans);
                column
                    .typed::<FixedLenByteArrayType>()
                    .write_batch(&spans, Some(levels.as_slice()), None)?;
            }
            _ => {
                let labels: Vec<ByteArray> =
                    SPANS.iter().map(|(_, _, label)| ByteArray::from(*label)).collect();
                column.typed::<ByteArrayType>().write_batch(&labels, None, None)?;
            }
        }
        column.close().context("close column")?;
        index += 1;
    }
    group.close().context("close row group")?;

    writer.close().context("close writer")?;
    Ok(())
}

/// Writes one row holding nothing but an INTERVAL column.
pub fn write_span_only_file(path: &Path) -> Result<()> {
    let mut writer = create_writer(path, SPAN_ONLY_SCHEMA)?;
    let mut group = writer.next_row_group().context("start row group")?;

    while let Some(mut column) = group.next_column().context("next column")? {
        column
            .typed::<FixedLenByteArrayType>()
            .write_batch(&[interval((5, 6, 7))], None, None)?;
        column.close().context("close column")?;
    }
    group.close().context("close row group")?;

    writer.close().context("close writer")?;
    Ok(())
}

/// Writes one row whose INTERVAL column sits inside an optional group.
pub fn write_nested_span_file(path: &Path) -> Result<()> {
    let mut writer = create_writer(path, NESTED_SPAN_SCHEMA)?;
    let mut group = writer.next_row_group().context("start row group")?;
    let mut index = 0;

    while let Some(mut column) = group.next_column().context("next column")? {
        match index {
            0 => {
                column.typed::<Int64Type>().write_batch(&[1], None, None)?;
            }
            _ => {
                column.typed::<FixedLenByteArrayType>().write_batch(
                    &[interval((1, 1, 1))],
                    Some(&[1][..]),
                    None,
                )?;
            }
        }
        column.close().context("close column")?;
        index += 1;
    }
    group.close().context("close row group")?;

    writer.close().context("close writer")?;
    Ok(())
}

/// Writes one row of decimal-annotated integers: price 12345 (123.45) and
/// total -9876543210 (-987654.3210), stored unscaled.
pub fn write_decimals_file(path: &Path) -> Result<()> {
    let mut writer = create_writer(path, DECIMALS_SCHEMA)?;
    let mut group = writer.next_row_group().context("start row group")?;
    let mut index = 0;

    while let Some(mut column) = group.next_column().context("next column")? {
        match index {
            0 => {
                column.typed::<Int32Type>().write_batch(&[12345], None, None)?;
            }
            _ => {
                column
                    .typed::<Int64Type>()
                    .write_batch(&[-9_876_543_210], None, None)?;
            }
        }
        column.close().context("close column")?;
        index += 1;
    }
    group.close().context("close row group")?;

    writer.close().context("close writer")?;
    Ok(())
}
