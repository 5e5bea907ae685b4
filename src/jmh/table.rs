//! Result tables and the pivot into chart-ready groups
//!
//! A `ResultTable` is a thin wrapper around a Polars DataFrame whose columns are
//! named after the source fields (CSV headers or dotted JSON paths). Charts never
//! read the DataFrame directly; they pivot it into a `PivotTable` of
//! categories (x-axis groups) × series (bars inside a group).

use super::error::{PlotError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// How to combine multiple results that land in the same pivot cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAggregation {
    /// Use the first result in file order
    #[default]
    First,
    /// Use the last result in file order
    Last,
    /// Mean of all results
    Mean,
    /// Median of all results
    Median,
}

impl CellAggregation {
    /// Parse from string value
    ///
    /// Validation happens in the property reader; unknown values map to `First`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "last" => Self::Last,
            "mean" => Self::Mean,
            "median" => Self::Median,
            _ => Self::First,
        }
    }

    /// Combine the values of one cell (None for an empty cell)
    pub fn combine(&self, values: &[f64]) -> Option<f64> {
        match self {
            Self::First => values.first().copied(),
            Self::Last => values.last().copied(),
            Self::Mean => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            Self::Median => {
                if values.is_empty() {
                    return None;
                }
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
                } else {
                    Some(sorted[mid])
                }
            }
        }
    }
}

/// Order of the series (bars) inside each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesOrder {
    /// First appearance in the result file
    #[default]
    Appearance,
    /// Lexicographic by raw series value
    Sorted,
}

/// Which columns play which role in a pivot
#[derive(Debug, Clone, Copy)]
pub struct PivotSpec<'a> {
    pub category: &'a str,
    pub series: &'a str,
    pub value: &'a str,
    pub error: Option<&'a str>,
    pub order: SeriesOrder,
    pub aggregation: CellAggregation,
}

/// Benchmark results as loaded from a CSV or JSON file
#[derive(Debug, Clone)]
pub struct ResultTable {
    df: DataFrame,
}

impl ResultTable {
    pub fn from_polars(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn nrow(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.df
            .column(name)
            .map_err(|_| PlotError::MissingColumn(name.to_string()))
    }

    /// Values of a column as labels (numeric columns are formatted)
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        let as_strings = column.cast(&DataType::String)?;
        let values = as_strings
            .str()?
            .iter()
            .map(|opt| opt.map(|s| s.to_string()))
            .collect();
        Ok(values)
    }

    /// Values of a column as f64
    ///
    /// String columns are parsed; blank strings become null. Any other
    /// non-numeric column is rejected. NaN and infinities count as missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = self.raw_numeric_values(name)?;
        Ok(values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect())
    }

    fn raw_numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;

        match column.dtype() {
            DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8 => {
                let as_f64 = column.cast(&DataType::Float64)?;
                Ok(as_f64.f64()?.iter().collect())
            }
            DataType::String => column
                .str()?
                .iter()
                .map(|opt| match opt.map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(s) => s.parse::<f64>().map(Some).map_err(|_| {
                        PlotError::InvalidColumn {
                            column: name.to_string(),
                            reason: format!("'{}' is not a number", s),
                        }
                    }),
                })
                .collect(),
            DataType::Null => Ok(vec![None; column.len()]),
            other => Err(PlotError::InvalidColumn {
                column: name.to_string(),
                reason: format!("expected numbers, found {:?}", other),
            }),
        }
    }

    /// Distinct non-null values in order of first appearance
    pub fn unique_in_order(&self, name: &str) -> Result<Vec<String>> {
        Ok(unique_in_order(self.string_values(name)?.iter().flatten()))
    }

    /// Keep only rows whose `column` value is one of `keep`
    pub fn filter_series(&self, column: &str, keep: &[String]) -> Result<ResultTable> {
        let values = self.string_values(column)?;
        let mask_values: Vec<bool> = values
            .iter()
            .map(|opt| {
                opt.as_deref()
                    .map(|v| keep.iter().any(|k| k == v))
                    .unwrap_or(false)
            })
            .collect();
        let mask = BooleanChunked::new("mask".into(), &mask_values);

        let filtered = self.df.filter(&mask)?;
        tracing::debug!(
            column,
            kept = filtered.height(),
            dropped = self.df.height() - filtered.height(),
            "filtered results"
        );
        Ok(ResultTable::from_polars(filtered))
    }

    /// Replace labels in `column` using `map`; unmapped labels are kept as-is
    pub fn relabel(&self, column: &str, map: &HashMap<String, String>) -> Result<ResultTable> {
        if map.is_empty() {
            return Ok(self.clone());
        }

        let relabelled: Vec<Option<String>> = self
            .string_values(column)?
            .into_iter()
            .map(|opt| opt.map(|v| map.get(&v).cloned().unwrap_or(v)))
            .collect();

        let mut df = self.df.clone();
        df.with_column(Series::new(column.into(), relabelled))?;
        Ok(ResultTable::from_polars(df))
    }

    /// Pivot into categories × series
    ///
    /// Categories keep first-appearance order. Rows with a null category,
    /// series or value do not contribute a value; a cell nobody filled stays
    /// `None`.
    pub fn pivot(&self, spec: &PivotSpec<'_>) -> Result<PivotTable> {
        let categories_raw = self.string_values(spec.category)?;
        let series_raw = self.string_values(spec.series)?;
        let values = self.numeric_values(spec.value)?;
        let errors = match spec.error {
            Some(column) => Some(self.numeric_values(column)?),
            None => None,
        };

        let categories = unique_in_order(categories_raw.iter().flatten());
        let mut series = unique_in_order(series_raw.iter().flatten());
        if spec.order == SeriesOrder::Sorted {
            series.sort();
        }

        let category_index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let series_index: HashMap<&str, usize> = series
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut cell_values: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        let mut cell_errors: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        let mut skipped = 0usize;

        for row in 0..self.nrow() {
            let (Some(category), Some(series_name), Some(value)) = (
                categories_raw[row].as_deref(),
                series_raw[row].as_deref(),
                values[row],
            ) else {
                skipped += 1;
                continue;
            };
            let key = (category_index[category], series_index[series_name]);
            cell_values.entry(key).or_default().push(value);
            if let Some(err) = errors.as_ref().and_then(|e| e[row]) {
                cell_errors.entry(key).or_default().push(err);
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped, "rows without category, series or value ignored");
        }

        let aggregate = |cells: &HashMap<(usize, usize), Vec<f64>>| -> Vec<Vec<Option<f64>>> {
            (0..categories.len())
                .map(|c| {
                    (0..series.len())
                        .map(|s| {
                            cells
                                .get(&(c, s))
                                .and_then(|v| spec.aggregation.combine(v))
                        })
                        .collect()
                })
                .collect()
        };

        let pivot_values = aggregate(&cell_values);
        let pivot_errors = aggregate(&cell_errors);

        Ok(PivotTable {
            categories,
            series,
            values: pivot_values,
            errors: pivot_errors,
        })
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// Results reshaped for a grouped bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    categories: Vec<String>,
    series: Vec<String>,
    /// values[category][series]
    values: Vec<Vec<Option<f64>>>,
    errors: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    pub fn value(&self, category: usize, series: usize) -> Option<f64> {
        self.values
            .get(category)
            .and_then(|row| row.get(series))
            .copied()
            .flatten()
    }

    pub fn error(&self, category: usize, series: usize) -> Option<f64> {
        self.errors
            .get(category)
            .and_then(|row| row.get(series))
            .copied()
            .flatten()
    }

    /// One series across all categories
    pub fn series_values(&self, series: usize) -> Vec<Option<f64>> {
        (0..self.categories.len())
            .map(|c| self.value(c, series))
            .collect()
    }

    /// True when no cell has a value
    pub fn is_empty(&self) -> bool {
        self.values.iter().flatten().all(Option::is_none)
    }

    /// (category, series) pairs without a value
    pub fn missing_cells(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for (c, category) in self.categories.iter().enumerate() {
            for (s, series) in self.series.iter().enumerate() {
                if self.value(c, s).is_none() {
                    missing.push((category.clone(), series.clone()));
                }
            }
        }
        missing
    }

    /// Tallest bar, optionally including its error whisker
    pub fn max_value(&self, with_errors: bool) -> Option<f64> {
        let mut max: Option<f64> = None;
        for c in 0..self.categories.len() {
            for s in 0..self.series.len() {
                if let Some(v) = self.value(c, s) {
                    let top = if with_errors {
                        v + self.error(c, s).unwrap_or(0.0)
                    } else {
                        v
                    };
                    max = Some(max.map_or(top, |m| m.max(top)));
                }
            }
        }
        max
    }

    /// Rename series for display (legend entries)
    pub fn with_series_labels(mut self, labels: &HashMap<String, String>) -> Self {
        for name in self.series.iter_mut() {
            if let Some(label) = labels.get(name) {
                *name = label.clone();
            }
        }
        self
    }
}

impl fmt::Display for PivotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first_width = self
            .categories
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(8);
        let widths: Vec<usize> = self.series.iter().map(|s| s.len().max(10)).collect();

        write!(f, "{:<first_width$}", "")?;
        for (name, width) in self.series.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }
        writeln!(f)?;

        for (c, category) in self.categories.iter().enumerate() {
            write!(f, "{:<first_width$}", category)?;
            for (s, width) in widths.iter().enumerate() {
                match self.value(c, s) {
                    Some(v) => write!(f, "  {:>width$.3}", v, width = *width)?,
                    None => write!(f, "  {:>width$}", "-", width = *width)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convolution_table() -> ResultTable {
        let df = df! {
            "Param: imageName" => ["bird.png", "bird.png", "kha.bmp", "kha.bmp", "bird.png", "kha.bmp"],
            "Param: mode" => ["SEQ", "ROWS", "SEQ", "ROWS", "GRID", "GRID"],
            "Score" => [12.5, 4.0, 60.0, 18.25, 5.5, 20.0],
            "Score Error (99.9%)" => [0.5, 0.25, 2.0, 1.0, 0.1, 0.3]
        }
        .unwrap();
        ResultTable::from_polars(df)
    }

    fn spec<'a>() -> PivotSpec<'a> {
        PivotSpec {
            category: "Param: mode",
            series: "Param: imageName",
            value: "Score",
            error: None,
            order: SeriesOrder::Appearance,
            aggregation: CellAggregation::First,
        }
    }

    #[test]
    fn test_unique_in_order() {
        let table = convolution_table();
        assert_eq!(
            table.unique_in_order("Param: mode").unwrap(),
            vec!["SEQ", "ROWS", "GRID"]
        );
        assert_eq!(
            table.unique_in_order("Param: imageName").unwrap(),
            vec!["bird.png", "kha.bmp"]
        );
    }

    #[test]
    fn test_pivot_groups_by_category_and_series() {
        let pivot = convolution_table().pivot(&spec()).unwrap();

        assert_eq!(pivot.categories(), ["SEQ", "ROWS", "GRID"]);
        assert_eq!(pivot.series(), ["bird.png", "kha.bmp"]);
        assert_eq!(pivot.series_values(0), vec![Some(12.5), Some(4.0), Some(5.5)]);
        assert_eq!(pivot.series_values(1), vec![Some(60.0), Some(18.25), Some(20.0)]);
        assert!(pivot.missing_cells().is_empty());
        assert_eq!(pivot.max_value(false), Some(60.0));
    }

    #[test]
    fn test_pivot_with_errors() {
        let mut s = spec();
        s.error = Some("Score Error (99.9%)");
        let pivot = convolution_table().pivot(&s).unwrap();

        assert_eq!(pivot.error(0, 1), Some(2.0));
        assert_eq!(pivot.max_value(true), Some(62.0));
    }

    #[test]
    fn test_pivot_sorted_series() {
        let df = df! {
            "mode" => ["a", "a", "b", "b"],
            "benchmark" => ["seqPipeline", "parallelPipeline", "seqPipeline", "parallelPipeline"],
            "score" => [2.0, 1.0, 4.0, 3.0]
        }
        .unwrap();
        let table = ResultTable::from_polars(df);
        let pivot = table
            .pivot(&PivotSpec {
                category: "mode",
                series: "benchmark",
                value: "score",
                error: None,
                order: SeriesOrder::Sorted,
                aggregation: CellAggregation::First,
            })
            .unwrap();

        assert_eq!(pivot.series(), ["parallelPipeline", "seqPipeline"]);
        assert_eq!(pivot.series_values(0), vec![Some(1.0), Some(3.0)]);
        assert_eq!(pivot.series_values(1), vec![Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_pivot_missing_cell() {
        let df = df! {
            "mode" => ["a", "a", "b"],
            "img" => ["x", "y", "x"],
            "score" => [1.0, 2.0, 3.0]
        }
        .unwrap();
        let pivot = ResultTable::from_polars(df)
            .pivot(&PivotSpec {
                category: "mode",
                series: "img",
                value: "score",
                error: None,
                order: SeriesOrder::Appearance,
                aggregation: CellAggregation::First,
            })
            .unwrap();

        assert_eq!(pivot.value(1, 1), None);
        assert_eq!(
            pivot.missing_cells(),
            vec![("b".to_string(), "y".to_string())]
        );
        assert!(!pivot.is_empty());
    }

    #[test]
    fn test_pivot_duplicate_cells_aggregated() {
        let df = df! {
            "mode" => ["a", "a", "a"],
            "img" => ["x", "x", "x"],
            "score" => [1.0, 5.0, 3.0]
        }
        .unwrap();
        let table = ResultTable::from_polars(df);
        let pivot_with = |aggregation| {
            table
                .pivot(&PivotSpec {
                    category: "mode",
                    series: "img",
                    value: "score",
                    error: None,
                    order: SeriesOrder::Appearance,
                    aggregation,
                })
                .unwrap()
                .value(0, 0)
        };

        assert_eq!(pivot_with(CellAggregation::First), Some(1.0));
        assert_eq!(pivot_with(CellAggregation::Last), Some(3.0));
        assert_eq!(pivot_with(CellAggregation::Mean), Some(3.0));
        assert_eq!(pivot_with(CellAggregation::Median), Some(3.0));
    }

    #[test]
    fn test_filter_series() {
        let filtered = convolution_table()
            .filter_series("Param: imageName", &["kha.bmp".to_string()])
            .unwrap();
        assert_eq!(filtered.nrow(), 3);
        assert_eq!(
            filtered.unique_in_order("Param: imageName").unwrap(),
            vec!["kha.bmp"]
        );
    }

    #[test]
    fn test_relabel_keeps_unmapped() {
        let map = HashMap::from([("bird.png".to_string(), "1280x853".to_string())]);
        let relabelled = convolution_table()
            .relabel("Param: imageName", &map)
            .unwrap();
        assert_eq!(
            relabelled.unique_in_order("Param: imageName").unwrap(),
            vec!["1280x853", "kha.bmp"]
        );
    }

    #[test]
    fn test_numeric_values_from_strings() {
        let df = df! {
            "score" => ["1.5", "", "2"]
        }
        .unwrap();
        let table = ResultTable::from_polars(df);
        assert_eq!(
            table.numeric_values("score").unwrap(),
            vec![Some(1.5), None, Some(2.0)]
        );
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let df = df! {
            "score" => ["fast"]
        }
        .unwrap();
        let err = ResultTable::from_polars(df).numeric_values("score").unwrap_err();
        assert!(matches!(err, PlotError::InvalidColumn { .. }));
    }

    #[test]
    fn test_missing_column() {
        let err = convolution_table().string_values("nope").unwrap_err();
        assert!(matches!(err, PlotError::MissingColumn(name) if name == "nope"));
    }

    #[test]
    fn test_series_labels_and_display() {
        let labels = HashMap::from([("bird.png".to_string(), "1280x853".to_string())]);
        let pivot = convolution_table()
            .pivot(&spec())
            .unwrap()
            .with_series_labels(&labels);
        assert_eq!(pivot.series(), ["1280x853", "kha.bmp"]);

        let text = pivot.to_string();
        assert!(text.contains("1280x853"));
        assert!(text.contains("18.250"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_cell_aggregation_parse() {
        assert_eq!(CellAggregation::parse("MEAN"), CellAggregation::Mean);
        assert_eq!(CellAggregation::parse("median"), CellAggregation::Median);
        assert_eq!(CellAggregation::parse("last"), CellAggregation::Last);
        assert_eq!(CellAggregation::parse("whatever"), CellAggregation::First);
        assert_eq!(CellAggregation::Median.combine(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(CellAggregation::Mean.combine(&[]), None);
    }
}
