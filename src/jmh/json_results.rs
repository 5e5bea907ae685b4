//! JMH JSON result loading
//!
//! The JSON report is an array with one object per benchmark run:
//!
//! ```json
//! [{
//!   "benchmark": "bench.pipeline.BenchPipeline.parallelPipeline",
//!   "mode": "avgt",
//!   "params": { "mode": "SMALL" },
//!   "primaryMetric": { "score": 1.25, "scoreError": 0.02, "scoreUnit": "s/op" }
//! }]
//! ```
//!
//! Nested fields are addressed with dotted paths (`params.mode`,
//! `primaryMetric.score`). Each requested path becomes one column of the
//! resulting table, named after the path.
//!
//! A `RunFilter` drops runs before any field is read, so runs of unrelated
//! benchmarks in the same report may lack the chart's params.

use super::error::{PlotError, Result};
use super::table::ResultTable;
use polars::prelude::*;
use serde_json::Value;
use std::path::Path;

/// Keeps only runs whose value at `path` is one of `values`
#[derive(Debug, Clone, Copy)]
pub struct RunFilter<'a> {
    pub path: &'a str,
    pub values: &'a [String],
}

impl RunFilter<'_> {
    fn keeps(&self, run: &Value) -> bool {
        lookup(run, self.path)
            .and_then(scalar_text)
            .is_some_and(|text| self.values.iter().any(|v| *v == text))
    }
}

/// Load a JMH JSON result file, extracting the given dotted paths
pub fn load_json(
    path: &Path,
    fields: &[&str],
    filter: Option<RunFilter<'_>>,
) -> Result<ResultTable> {
    let text = std::fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read JSON results");
    parse_json(&text, fields, filter)
}

/// Parse JMH JSON content already in memory
pub fn parse_json(
    text: &str,
    fields: &[&str],
    filter: Option<RunFilter<'_>>,
) -> Result<ResultTable> {
    let document: Value = serde_json::from_str(text)?;
    let all_runs = document.as_array().ok_or_else(|| {
        PlotError::InvalidFormat("expected a JSON array of benchmark runs".to_string())
    })?;

    // Indices stay those of the report so errors point at the right run
    let runs: Vec<(usize, &Value)> = all_runs
        .iter()
        .enumerate()
        .filter(|(_, run)| filter.map_or(true, |f| f.keeps(run)))
        .collect();
    if runs.len() < all_runs.len() {
        tracing::debug!(
            kept = runs.len(),
            skipped = all_runs.len() - runs.len(),
            "filtered benchmark runs"
        );
    }

    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        let mut values = Vec::with_capacity(runs.len());
        for &(index, run) in &runs {
            let value = lookup(run, field).ok_or_else(|| PlotError::MissingField {
                index,
                path: field.to_string(),
            })?;
            values.push(value);
        }
        columns.push(values_to_series(field, &values)?.into_column());
    }

    let df = DataFrame::new(columns)?;
    tracing::debug!(rows = df.height(), fields = ?fields, "parsed JSON results");
    Ok(ResultTable::from_polars(df))
}

/// Follow a dotted path through nested objects
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers-only columns become f64, anything else becomes strings
fn values_to_series(name: &str, values: &[&Value]) -> Result<Series> {
    let all_numeric = values.iter().all(|v| v.is_number() || v.is_null());

    if all_numeric {
        let numbers: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        return Ok(Series::new(name.into(), numbers));
    }

    let strings = values
        .iter()
        .map(|v| match v {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Array(_) | Value::Object(_) => Err(PlotError::InvalidColumn {
                column: name.to_string(),
                reason: "nested value where a scalar was expected".to_string(),
            }),
        })
        .collect::<Result<Vec<Option<String>>>>()?;
    Ok(Series::new(name.into(), strings))
}
