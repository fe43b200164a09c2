//! Row Scan Module
//!
//! Single-pass row pipelines over an open source: skip/limit/projection for
//! full reads, and fixed-size chunk delivery for streaming reads.

use std::ops::ControlFlow;

use tracing::debug;

use crate::error::{CallbackError, ReaderError, Result};
use crate::reader::{ParquetSource, ReadOptions};
use crate::record::{assemble, RowRecord};

/// Counters for one full read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Rows the scan passed over, skipped ones included
    pub encountered: usize,
    /// Rows returned to the caller
    pub emitted: usize,
}

// == Collect Rows ==
/// Reads the rows selected by `options`, in storage order.
///
/// The first `skip_rows` rows are discarded and reading stops once
/// `row_limit` rows have been kept. Row groups that fall entirely inside the
/// skipped prefix are passed over using footer row counts without decoding.
pub fn collect_rows(
    source: &ParquetSource,
    options: &ReadOptions,
) -> Result<(Vec<RowRecord>, ScanSummary)> {
    let mut summary = ScanSummary::default();
    let mut rows = Vec::new();
    let row_limit = options.row_limit.filter(|limit| *limit > 0);

    let mut first_group = 0;
    while first_group < source.num_row_groups() {
        let group_rows = source.row_group_rows(first_group);
        if summary.encountered + group_rows > options.skip_rows {
            break;
        }
        summary.encountered += group_rows;
        first_group += 1;
    }
    if first_group > 0 {
        debug!(
            path = source.path(),
            groups = first_group,
            rows = summary.encountered,
            "Bypassed skipped row groups"
        );
    }

    let columns = source.columns();
    let projection = options.columns.as_ref();

    source.visit_rows(first_group, |values| {
        summary.encountered += 1;
        if summary.encountered <= options.skip_rows {
            return Ok(ControlFlow::Continue(()));
        }

        rows.push(assemble(columns, &values, projection));
        summary.emitted += 1;

        match row_limit {
            Some(limit) if summary.emitted >= limit => Ok(ControlFlow::Break(())),
            _ => Ok(ControlFlow::Continue(())),
        }
    })?;

    Ok((rows, summary))
}

// == Stream Chunks ==
/// Delivers every row, unprojected, to `on_chunk` in chunks of `chunk_size`
/// rows, with a final shorter chunk for any remainder.
///
/// Returns the number of chunks delivered. A failing `on_chunk` stops the
/// scan at once and its error comes back as [`ReaderError::Callback`].
pub fn stream_chunks<F, E>(
    source: &ParquetSource,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<usize>
where
    F: FnMut(Vec<RowRecord>) -> std::result::Result<(), E>,
    E: Into<CallbackError>,
{
    let chunk_size = chunk_size.max(1);
    let columns = source.columns();
    let mut buffer = Vec::with_capacity(chunk_size);
    let mut delivered = 0;

    let mut deliver = |chunk: Vec<RowRecord>| -> Result<()> {
        on_chunk(chunk).map_err(|e| ReaderError::Callback(e.into()))?;
        delivered += 1;
        Ok(())
    };

    source.visit_rows(0, |values| {
        buffer.push(assemble(columns, &values, None));
        if buffer.len() >= chunk_size {
            let chunk = std::mem::replace(&mut buffer, Vec::with_capacity(chunk_size));
            deliver(chunk)?;
        }
        Ok(ControlFlow::Continue(()))
    })?;

    if !buffer.is_empty() {
        deliver(buffer)?;
    }

    Ok(delivered)
}
