//! JMH CSV result loading
//!
//! JMH writes one row per benchmark run with quoted headers, e.g.
//! `"Benchmark","Mode","Threads","Samples","Score","Score Error (99.9%)","Unit","Param: imageName","Param: mode"`.
//! Columns keep their header names; charts refer to them verbatim.

use super::error::{PlotError, Result};
use super::table::ResultTable;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Load a JMH CSV result file
pub fn load_csv(path: &Path) -> Result<ResultTable> {
    let bytes = std::fs::read(path).map_err(|e| PlotError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read CSV results");
    parse_csv(bytes)
}

/// Parse JMH CSV content already in memory
pub fn parse_csv(bytes: Vec<u8>) -> Result<ResultTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    tracing::debug!(
        rows = df.height(),
        columns = ?df.get_column_names(),
        "parsed CSV results"
    );
    Ok(ResultTable::from_polars(df))
}
