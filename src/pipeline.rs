//! Shared chart generation pipeline
//!
//! For each chart:
//! 1. Load the result file (CSV or JSON)
//! 2. Filter and relabel, then pivot into groups × series
//! 3. Render the grouped bar chart
//! 4. Save the PNG

use crate::chart::bar_chart;
use crate::chart::{ChartDefinition, InputFormat};
use crate::config::PlotConfig;
use crate::jmh::{self, PivotTable, PlotError, Result, ResultTable};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where results are read from and images written to
#[derive(Debug, Clone)]
pub struct PipelineDirs {
    pub results_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineDirs {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("app/build/results/jmh"),
            output_dir: PathBuf::from("."),
        }
    }
}

/// A rendered chart
#[derive(Debug, Clone)]
pub struct ChartResult {
    pub chart: String,
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pivot: PivotTable,
}

fn log_phase(start: Instant, chart: &str, phase: &str) {
    tracing::info!(
        chart,
        elapsed_s = start.elapsed().as_secs_f64(),
        "{}",
        phase
    );
}

/// Load the chart's result file from `results_dir`
///
/// JSON runs outside the chart's series filter are dropped before their
/// fields are read.
pub fn load_results(
    chart: &ChartDefinition,
    config: &PlotConfig,
    results_dir: &Path,
) -> Result<ResultTable> {
    let path = results_dir.join(&chart.input);
    match chart.format {
        InputFormat::Csv => jmh::load_csv(&path),
        InputFormat::Json => jmh::load_json(
            &path,
            &chart.json_fields(config.error_bars),
            chart.run_filter(),
        ),
    }
}

/// Filter, relabel and pivot loaded results for `chart`
pub fn prepare_pivot(
    table: &ResultTable,
    chart: &ChartDefinition,
    config: &PlotConfig,
) -> Result<PivotTable> {
    let filtered = if chart.series_filter.is_empty() {
        table.clone()
    } else {
        table.filter_series(&chart.series, &chart.series_filter)?
    };
    let relabelled = filtered.relabel(&chart.category, &chart.category_labels)?;

    let spec = chart.pivot_spec(config.cell_aggregation, config.error_bars);
    let pivot = relabelled
        .pivot(&spec)?
        .with_series_labels(&chart.series_labels);

    if pivot.is_empty() {
        return Err(PlotError::Empty(chart.name.clone()));
    }

    for (category, series) in pivot.missing_cells() {
        tracing::warn!(
            chart = %chart.name,
            category = %category,
            series = %series,
            "no result for this bar"
        );
    }

    Ok(pivot)
}

/// Run the whole pipeline for one chart
pub fn generate_chart(
    chart: &ChartDefinition,
    config: &PlotConfig,
    dirs: &PipelineDirs,
) -> Result<ChartResult> {
    let start = Instant::now();

    log_phase(start, &chart.name, "[1/4] Loading results");
    let table = load_results(chart, config, &dirs.results_dir)?;
    tracing::debug!(rows = table.nrow(), columns = ?table.column_names(), "loaded");

    log_phase(start, &chart.name, "[2/4] Pivoting results");
    let pivot = prepare_pivot(&table, chart, config)?;
    println!("{}:\n{}", chart.title, pivot);

    log_phase(start, &chart.name, "[3/4] Rendering chart");
    let (width, height) = config.resolve_dimensions(pivot.categories().len());
    if !dirs.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&dirs.output_dir)
            .map_err(|e| PlotError::io(&dirs.output_dir, e))?;
    }
    let output_path = dirs.output_dir.join(&chart.output);
    bar_chart::render_png(&output_path, (width, height), &pivot, chart, config)?;

    log_phase(start, &chart.name, "[4/4] Saved");

    Ok(ChartResult {
        chart: chart.name.clone(),
        output_path,
        width,
        height,
        pivot,
    })
}

/// Run every chart in order; a failing chart does not stop the others
pub fn generate_all(
    charts: &[&ChartDefinition],
    config: &PlotConfig,
    dirs: &PipelineDirs,
) -> Vec<(String, Result<ChartResult>)> {
    charts
        .iter()
        .map(|chart| {
            let result = generate_chart(chart, config, dirs);
            if let Err(e) = &result {
                tracing::error!(chart = %chart.name, "chart failed: {}", e);
            }
            (chart.name.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::builtin_charts;
    use crate::chart::PropertyValue;

    const PIPELINE_JSON: &str = r#"[
        {"benchmark": "bench.pipeline.BenchPipeline.seqPipeline", "params": {"mode": "SMALL"},
         "primaryMetric": {"score": 4.0, "scoreError": 0.2}},
        {"benchmark": "bench.pipeline.BenchPipeline.parallelPipeline", "params": {"mode": "SMALL"},
         "primaryMetric": {"score": 1.5, "scoreError": 0.1}},
        {"benchmark": "bench.pipeline.BenchPipeline.other", "params": {"mode": "SMALL"},
         "primaryMetric": {"score": 99.0, "scoreError": 1.0}},
        {"benchmark": "bench.pipeline.BenchPipeline.seqPipeline", "params": {"mode": "LARGE"},
         "primaryMetric": {"score": 40.0, "scoreError": 2.0}},
        {"benchmark": "bench.pipeline.BenchPipeline.parallelPipeline", "params": {"mode": "LARGE"},
         "primaryMetric": {"score": 11.0, "scoreError": 0.5}}
    ]"#;

    #[test]
    fn test_prepare_pipeline_pivot() {
        let chart = builtin_charts().get("pipelines").unwrap();
        let fields = chart.json_fields(false);
        let table = jmh::json_results::parse_json(PIPELINE_JSON, &fields, None).unwrap();
        let pivot = prepare_pivot(&table, chart, &PlotConfig::default()).unwrap();

        assert_eq!(pivot.categories(), ["SMALL", "LARGE"]);
        // Sorted by benchmark name, so parallel comes first
        assert_eq!(pivot.series(), ["parallel pipeline", "sequential pipeline"]);
        assert_eq!(pivot.series_values(0), vec![Some(1.5), Some(11.0)]);
        assert_eq!(pivot.series_values(1), vec![Some(4.0), Some(40.0)]);
        assert_eq!(pivot.max_value(false), Some(40.0));
        // Error bars are off by default
        assert_eq!(pivot.error(0, 0), None);
    }

    #[test]
    fn test_prepare_with_error_bars() {
        let chart = builtin_charts().get("pipelines").unwrap();
        let config = PlotConfig::from_properties(&[PropertyValue::parse("errorbars=true").unwrap()]);
        let fields = chart.json_fields(config.error_bars);
        let table = jmh::json_results::parse_json(PIPELINE_JSON, &fields, None).unwrap();
        let pivot = prepare_pivot(&table, chart, &config).unwrap();

        assert_eq!(pivot.error(1, 1), Some(2.0));
    }

    #[test]
    fn test_prepare_empty_after_filter() {
        let chart = builtin_charts().get("pipelines").unwrap();
        let json = r#"[{"benchmark": "x.other", "params": {"mode": "A"},
                        "primaryMetric": {"score": 1.0, "scoreError": 0.1}}]"#;
        let fields = chart.json_fields(false);
        let table = jmh::json_results::parse_json(json, &fields, None).unwrap();
        let err = prepare_pivot(&table, chart, &PlotConfig::default()).unwrap_err();
        assert!(matches!(err, PlotError::Empty(name) if name == "pipelines"));
    }

    #[test]
    fn test_missing_results_file() {
        let chart = builtin_charts().get("convolution").unwrap();
        let dirs = PipelineDirs {
            results_dir: PathBuf::from("/nonexistent/results"),
            output_dir: PathBuf::from("/nonexistent/out"),
        };
        let results = generate_all(&[chart], &PlotConfig::default(), &dirs);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "convolution");
        assert!(matches!(results[0].1, Err(PlotError::Io { .. })));
    }
}
