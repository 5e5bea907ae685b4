//! Chart definitions
//!
//! The built-in charts come from charts.json (embedded at compile time). A
//! replacement file with the same schema can be loaded at runtime.

use crate::jmh::{CellAggregation, PivotSpec, PlotError, Result, RunFilter, SeriesOrder};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// charts.json embedded at compile time
const CHARTS_JSON: &str = include_str!("../../charts.json");

/// Result file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Json,
}

/// One grouped bar chart: where its data lives and how it is drawn
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDefinition {
    pub name: String,
    /// Result file, relative to the results directory
    pub input: String,
    pub format: InputFormat,
    /// Column (CSV header or dotted JSON path) for the x-axis groups
    pub category: String,
    /// Column for the bars inside a group
    pub series: String,
    /// Numeric score column
    pub value: String,
    /// Score error column, drawn as whiskers when enabled
    #[serde(default)]
    pub error: Option<String>,
    /// Keep only these series values (empty keeps everything)
    #[serde(default)]
    pub series_filter: Vec<String>,
    #[serde(default)]
    pub series_order: SeriesOrder,
    #[serde(default)]
    pub category_labels: HashMap<String, String>,
    #[serde(default)]
    pub series_labels: HashMap<String, String>,
    pub title: String,
    pub y_label: String,
    #[serde(default)]
    pub legend_title: Option<String>,
    /// Fraction of one x slot taken by a group of bars
    #[serde(default = "default_group_width")]
    pub group_width: f64,
    /// Output PNG file name
    pub output: String,
}

fn default_group_width() -> f64 {
    0.8
}

impl ChartDefinition {
    /// Dotted paths to extract from JSON results
    ///
    /// The error path is only read when error bars are drawn.
    pub fn json_fields(&self, with_errors: bool) -> Vec<&str> {
        let mut fields = vec![
            self.category.as_str(),
            self.series.as_str(),
            self.value.as_str(),
        ];
        if let (true, Some(error)) = (with_errors, &self.error) {
            fields.push(error.as_str());
        }
        fields
    }

    /// Series filter applied while loading JSON runs
    pub fn run_filter(&self) -> Option<RunFilter<'_>> {
        (!self.series_filter.is_empty()).then(|| RunFilter {
            path: &self.series,
            values: &self.series_filter,
        })
    }

    pub fn pivot_spec(&self, aggregation: CellAggregation, with_errors: bool) -> PivotSpec<'_> {
        PivotSpec {
            category: &self.category,
            series: &self.series,
            value: &self.value,
            error: if with_errors {
                self.error.as_deref()
            } else {
                None
            },
            order: self.series_order,
            aggregation,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlotError::Config("chart without a name".to_string()));
        }
        if !(self.group_width > 0.0 && self.group_width <= 1.0) {
            return Err(PlotError::Config(format!(
                "chart '{}': groupWidth {} must be in (0, 1]",
                self.name, self.group_width
            )));
        }
        if self.output.trim().is_empty() {
            return Err(PlotError::Config(format!(
                "chart '{}': empty output file name",
                self.name
            )));
        }
        Ok(())
    }
}

/// Chart definitions in file order
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: Vec<ChartDefinition>,
}

impl ChartRegistry {
    pub fn from_json(json: &str) -> Result<Self> {
        let charts: Vec<ChartDefinition> = serde_json::from_str(json)?;
        for chart in &charts {
            chart.validate()?;
        }
        Ok(Self { charts })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn get(&self, name: &str) -> Result<&ChartDefinition> {
        self.charts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PlotError::UnknownChart(name.to_string()))
    }

    pub fn charts(&self) -> &[ChartDefinition] {
        &self.charts
    }

    /// Resolve a selection by name; an empty selection means every chart
    pub fn select(&self, names: &[String]) -> Result<Vec<&ChartDefinition>> {
        if names.is_empty() {
            return Ok(self.charts.iter().collect());
        }
        names.iter().map(|n| self.get(n)).collect()
    }
}

static BUILTIN: OnceLock<ChartRegistry> = OnceLock::new();

/// The charts shipped with the binary
pub fn builtin_charts() -> &'static ChartRegistry {
    BUILTIN.get_or_init(|| {
        ChartRegistry::from_json(CHARTS_JSON).expect("embedded charts.json is invalid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_charts() {
        let registry = builtin_charts();
        let names: Vec<&str> = registry.charts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["convolution", "pipelines"]);

        let convolution = registry.get("convolution").unwrap();
        assert_eq!(convolution.format, InputFormat::Csv);
        assert_eq!(convolution.output, "convolution.png");
        assert_eq!(convolution.series_labels["kha.bmp"], "3000x2000");
        assert_eq!(convolution.series_order, SeriesOrder::Appearance);

        let pipelines = registry.get("pipelines").unwrap();
        assert_eq!(pipelines.format, InputFormat::Json);
        assert_eq!(pipelines.series_filter.len(), 2);
        assert_eq!(pipelines.series_order, SeriesOrder::Sorted);
        assert_eq!(pipelines.legend_title, None);
    }

    #[test]
    fn test_json_fields_and_pivot_spec() {
        let pipelines = builtin_charts().get("pipelines").unwrap();
        assert_eq!(
            pipelines.json_fields(false),
            vec!["params.mode", "benchmark", "primaryMetric.score"]
        );
        assert_eq!(
            pipelines.json_fields(true),
            vec![
                "params.mode",
                "benchmark",
                "primaryMetric.score",
                "primaryMetric.scoreError"
            ]
        );

        let filter = pipelines.run_filter().unwrap();
        assert_eq!(filter.path, "benchmark");
        assert_eq!(filter.values.len(), 2);
        assert!(builtin_charts().get("convolution").unwrap().run_filter().is_none());

        let spec = pipelines.pivot_spec(CellAggregation::Mean, false);
        assert_eq!(spec.error, None);
        assert_eq!(spec.aggregation, CellAggregation::Mean);
        let spec = pipelines.pivot_spec(CellAggregation::First, true);
        assert_eq!(spec.error, Some("primaryMetric.scoreError"));
    }

    #[test]
    fn test_select() {
        let registry = builtin_charts();
        assert_eq!(registry.select(&[]).unwrap().len(), 2);
        let selected = registry.select(&["pipelines".to_string()]).unwrap();
        assert_eq!(selected[0].name, "pipelines");
        assert!(matches!(
            registry.select(&["nope".to_string()]),
            Err(PlotError::UnknownChart(_))
        ));
    }

    #[test]
    fn test_defaults_and_validation() {
        let json = r#"[{
            "name": "minimal", "input": "r.csv", "format": "csv",
            "category": "a", "series": "b", "value": "c",
            "title": "T", "yLabel": "Y", "output": "m.png"
        }]"#;
        let registry = ChartRegistry::from_json(json).unwrap();
        let chart = registry.get("minimal").unwrap();
        assert_eq!(chart.group_width, 0.8);
        assert!(chart.series_filter.is_empty());
        assert_eq!(chart.error, None);

        let bad = json.replace(r#""output": "m.png""#, r#""output": "m.png", "groupWidth": 1.5"#);
        assert!(matches!(
            ChartRegistry::from_json(&bad),
            Err(PlotError::Config(_))
        ));
    }
}
