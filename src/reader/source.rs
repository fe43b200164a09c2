//! Parquet Source Module
//!
//! Owns the open file handle and footer for the duration of one call.

use std::fs::File;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::DataType;
use parquet::errors::ParquetError;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{FileReader, RowGroupReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::{ColumnDescriptor, SchemaDescriptor as ParquetSchema, Type};

use crate::error::{ReaderError, Result};
use crate::record::{columns_of, Column};

// == Decoding Plan ==
/// How rows of a file are decoded.
///
/// The record API panics on a few valid annotations (INTERVAL, for one).
/// Top-level columns carrying them are read through the typed column reader
/// instead and merged back by position.
enum Decoding {
    Rows,
    Mixed {
        /// Record API schema without the raw columns; `None` when nothing is left
        projection: Option<Type>,
        raw: Vec<RawColumn>,
    },
    /// A nested column carries such an annotation
    Unsupported(String),
}

/// A top-level primitive column read with the typed column reader.
struct RawColumn {
    position: usize,
    leaf: usize,
    max_def_level: i16,
}

/// Whether the record API converts values of this leaf column.
fn record_api_converts(column: &ColumnDescriptor) -> bool {
    use ConvertedType as C;

    let converted = column.converted_type();
    match column.physical_type() {
        PhysicalType::INT32 => matches!(
            converted,
            C::NONE
                | C::INT_8
                | C::INT_16
                | C::INT_32
                | C::UINT_8
                | C::UINT_16
                | C::UINT_32
                | C::DATE
                | C::TIME_MILLIS
                | C::DECIMAL
        ),
        PhysicalType::INT64 => matches!(
            converted,
            C::NONE
                | C::INT_64
                | C::UINT_64
                | C::TIME_MICROS
                | C::TIMESTAMP_MILLIS
                | C::TIMESTAMP_MICROS
                | C::DECIMAL
        ),
        PhysicalType::BYTE_ARRAY => matches!(
            converted,
            C::NONE | C::UTF8 | C::ENUM | C::JSON | C::BSON | C::DECIMAL
        ),
        PhysicalType::FIXED_LEN_BYTE_ARRAY => matches!(converted, C::NONE | C::DECIMAL),
        _ => true,
    }
}

fn plan_decoding(schema: &ParquetSchema) -> std::result::Result<Decoding, ParquetError> {
    let root = schema.root_schema();
    let mut raw: Vec<RawColumn> = Vec::new();

    for (leaf, column) in schema.columns().iter().enumerate() {
        if record_api_converts(column) {
            continue;
        }
        let position = schema.get_column_root_idx(leaf);
        let top_level = root.get_fields()[position].is_primitive() && column.max_rep_level() == 0;
        if !top_level {
            return Ok(Decoding::Unsupported(column.path().string()));
        }
        raw.push(RawColumn {
            position,
            leaf,
            max_def_level: column.max_def_level(),
        });
    }

    if raw.is_empty() {
        return Ok(Decoding::Rows);
    }

    let decoded: Vec<_> = root
        .get_fields()
        .iter()
        .enumerate()
        .filter(|(position, _)| raw.iter().all(|column| column.position != *position))
        .map(|(_, field)| Arc::clone(field))
        .collect();
    let projection = if decoded.is_empty() {
        None
    } else {
        Some(
            Type::group_type_builder(root.name())
                .with_fields(decoded)
                .build()?,
        )
    };

    Ok(Decoding::Mixed { projection, raw })
}

/// Reads every value of one raw column in a row group, nulls included.
fn read_raw_column(
    group: &dyn RowGroupReader,
    column: &RawColumn,
    num_rows: usize,
) -> std::result::Result<Vec<Field>, ParquetError> {
    match group.get_column_reader(column.leaf)? {
        ColumnReader::Int32ColumnReader(mut reader) => {
            collect_column(&mut reader, num_rows, column.max_def_level, Field::Int)
        }
        ColumnReader::Int64ColumnReader(mut reader) => {
            collect_column(&mut reader, num_rows, column.max_def_level, Field::Long)
        }
        ColumnReader::ByteArrayColumnReader(mut reader) => {
            collect_column(&mut reader, num_rows, column.max_def_level, Field::Bytes)
        }
        ColumnReader::FixedLenByteArrayColumnReader(mut reader) => {
            collect_column(&mut reader, num_rows, column.max_def_level, |value| {
                Field::Bytes(value.into())
            })
        }
        _ => Err(ParquetError::NYI(format!(
            "raw decoding of leaf column {}",
            column.leaf
        ))),
    }
}

fn collect_column<T, W>(
    reader: &mut ColumnReaderImpl<T>,
    num_rows: usize,
    max_def_level: i16,
    wrap: W,
) -> std::result::Result<Vec<Field>, ParquetError>
where
    T: DataType,
    W: Fn(T::T) -> Field,
{
    let mut def_levels = Vec::with_capacity(num_rows);
    let mut values = Vec::with_capacity(num_rows);
    let levels = (max_def_level > 0).then_some(&mut def_levels);

    let (records, _, _) = reader.read_records(num_rows, levels, None, &mut values)?;
    if records != num_rows {
        return Err(ParquetError::General(format!(
            "expected {} values in column chunk, found {}",
            num_rows, records
        )));
    }

    let mut values = values.into_iter();
    if max_def_level == 0 {
        return Ok(values.map(wrap).collect());
    }
    Ok(def_levels
        .iter()
        .map(|level| {
            if *level == max_def_level {
                values.next().map(&wrap).unwrap_or(Field::Null)
            } else {
                Field::Null
            }
        })
        .collect())
}

// == Parquet Source ==
/// An opened Parquet file.
///
/// Dropping the source closes the file, so every exit path of a read
/// releases it.
pub struct ParquetSource {
    path: String,
    reader: SerializedFileReader<File>,
    byte_size: u64,
    columns: Arc<[Column]>,
    decoding: Decoding,
}

impl ParquetSource {
    // == Open ==
    /// Opens `path` and parses its footer.
    ///
    /// Open and stat failures are I/O errors; a footer that doesn't parse is
    /// a format error.
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();

        let file = File::open(path).map_err(|e| ReaderError::io(&display, e))?;
        let byte_size = file
            .metadata()
            .map_err(|e| ReaderError::io(&display, e))?
            .len();
        let reader =
            SerializedFileReader::new(file).map_err(|e| ReaderError::format(&display, e))?;
        let schema = reader.metadata().file_metadata().schema_descr();
        let columns = columns_of(schema);
        let decoding = plan_decoding(schema).map_err(|e| ReaderError::format(&display, e))?;

        Ok(Self {
            path: display,
            reader,
            byte_size,
            columns,
            decoding,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File length in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Top-level columns in schema order.
    pub fn columns(&self) -> &Arc<[Column]> {
        &self.columns
    }

    pub fn schema(&self) -> &ParquetSchema {
        self.reader.metadata().file_metadata().schema_descr()
    }

    pub fn metadata(&self) -> &ParquetMetaData {
        self.reader.metadata()
    }

    pub fn num_row_groups(&self) -> usize {
        self.reader.num_row_groups()
    }

    /// Row count of one row group, from the footer.
    pub fn row_group_rows(&self, index: usize) -> usize {
        let rows = self.reader.metadata().row_group(index).num_rows();
        usize::try_from(rows).unwrap_or(0)
    }

    fn format_error(&self, err: ParquetError) -> ReaderError {
        ReaderError::format(&self.path, err)
    }

    // == Visit Rows ==
    /// Decodes rows in storage order, starting at row group `first_group`,
    /// and hands each one to `visit` as values aligned with [`columns`].
    ///
    /// Decoding stops as soon as `visit` breaks or fails; the remaining rows
    /// are never read.
    ///
    /// [`columns`]: ParquetSource::columns
    pub fn visit_rows<F>(&self, first_group: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(Vec<Field>) -> Result<ControlFlow<()>>,
    {
        if let Decoding::Unsupported(column) = &self.decoding {
            return Err(self.format_error(ParquetError::NYI(format!(
                "row decoding of nested column {}",
                column
            ))));
        }

        for index in first_group..self.num_row_groups() {
            let group = self
                .reader
                .get_row_group(index)
                .map_err(|e| self.format_error(e))?;

            let flow = match &self.decoding {
                Decoding::Mixed { projection, raw } => self.visit_mixed(
                    group.as_ref(),
                    index,
                    projection.as_ref(),
                    raw,
                    &mut visit,
                )?,
                _ => self.visit_decoded(group.as_ref(), &mut visit)?,
            };
            if flow.is_break() {
                return Ok(());
            }
        }

        Ok(())
    }

    fn visit_decoded<F>(
        &self,
        group: &dyn RowGroupReader,
        visit: &mut F,
    ) -> Result<ControlFlow<()>>
    where
        F: FnMut(Vec<Field>) -> Result<ControlFlow<()>>,
    {
        let rows = group.get_row_iter(None).map_err(|e| self.format_error(e))?;

        for row in rows {
            let row = row.map_err(|e| self.format_error(e))?;
            let values: Vec<Field> = row
                .into_columns()
                .into_iter()
                .map(|(_, value)| value)
                .collect();

            if visit(values)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn visit_mixed<F>(
        &self,
        group: &dyn RowGroupReader,
        index: usize,
        projection: Option<&Type>,
        raw: &[RawColumn],
        visit: &mut F,
    ) -> Result<ControlFlow<()>>
    where
        F: FnMut(Vec<Field>) -> Result<ControlFlow<()>>,
    {
        let num_rows = self.row_group_rows(index);
        let mut raw_values = raw
            .iter()
            .map(|column| read_raw_column(group, column, num_rows).map(Vec::into_iter))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| self.format_error(e))?;

        let mut decoded = match projection {
            Some(projection) => Some(
                group
                    .get_row_iter(Some(projection.clone()))
                    .map_err(|e| self.format_error(e))?,
            ),
            None => None,
        };

        for _ in 0..num_rows {
            let mut row_values = match decoded.as_mut().map(Iterator::next) {
                Some(Some(row)) => row
                    .map_err(|e| self.format_error(e))?
                    .into_columns()
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect::<Vec<_>>()
                    .into_iter(),
                Some(None) => break,
                None => Vec::new().into_iter(),
            };

            let mut raw_iter = raw.iter().zip(raw_values.iter_mut()).peekable();
            let values: Vec<Field> = (0..self.columns.len())
                .map(|position| {
                    let value = match raw_iter.next_if(|(column, _)| column.position == position) {
                        Some((_, column_values)) => column_values.next(),
                        None => row_values.next(),
                    };
                    value.unwrap_or(Field::Null)
                })
                .collect();

            if visit(values)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }
}
