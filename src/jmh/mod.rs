//! JMH result loading and reshaping
//!
//! Structure:
//! - `csv_results.rs`: CSV reports (`-rf csv`)
//! - `json_results.rs`: JSON reports (`-rf json`)
//! - `table.rs`: ResultTable and the pivot into PivotTable
//! - `error.rs`: Error types

pub mod csv_results;
pub mod error;
pub mod json_results;
pub mod table;

pub use csv_results::load_csv;
pub use error::{PlotError, Result};
pub use json_results::{load_json, RunFilter};
pub use table::{CellAggregation, PivotSpec, PivotTable, ResultTable, SeriesOrder};
