//! bench_plot - render JMH benchmark results as grouped bar charts
//!
//! With no arguments every built-in chart is rendered from
//! `app/build/results/jmh/` into the current directory:
//! - `convolution.png` from `convolution_results.csv`
//! - `pipelines.png` from `pipeline_results.json`

use anyhow::{bail, Context};
use bench_plot::chart::plot_properties::registry;
use bench_plot::chart::{builtin_charts, ChartRegistry, PropertyValue};
use bench_plot::config::PlotConfig;
use bench_plot::pipeline::{self, PipelineDirs};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "bench_plot", version, about = "Grouped bar charts from JMH results")]
struct Args {
    /// Chart to render (repeatable); renders every chart when omitted
    #[arg(long = "chart", value_name = "NAME")]
    charts: Vec<String>,

    /// Directory holding the JMH result files
    #[arg(
        long,
        env = "BENCH_PLOT_RESULTS_DIR",
        default_value = "app/build/results/jmh"
    )]
    results_dir: PathBuf,

    /// Directory the PNG files are written to
    #[arg(long, env = "BENCH_PLOT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Chart definitions replacing the built-in ones
    #[arg(long = "charts", value_name = "FILE")]
    charts_file: Option<PathBuf>,

    /// Plot property override, e.g. --set palette=Set1 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_property)]
    properties: Vec<PropertyValue>,

    /// List charts and plot properties, then exit
    #[arg(long)]
    list: bool,
}

fn parse_property(s: &str) -> Result<PropertyValue, String> {
    PropertyValue::parse(s).map_err(|e| e.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_listing(charts: &ChartRegistry) {
    println!("Charts:");
    for chart in charts.charts() {
        println!("  {:<14} {} -> {}", chart.name, chart.input, chart.output);
    }
    println!("\nPlot properties (--set NAME=VALUE):");
    for def in registry().definitions() {
        println!("  {:<22} default '{}'", def.name, def.default_value);
        if let Some(values) = &def.valid_values {
            println!("  {:<22} one of [{}]", "", values.join(", "));
        }
        if !def.description.is_empty() {
            println!("  {:<22} {}", "", def.description);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let custom_charts;
    let charts: &ChartRegistry = match &args.charts_file {
        Some(path) => {
            custom_charts = ChartRegistry::from_file(path)
                .with_context(|| format!("loading chart definitions from {}", path.display()))?;
            &custom_charts
        }
        None => builtin_charts(),
    };

    if args.list {
        print_listing(charts);
        return Ok(());
    }

    let selected = charts.select(&args.charts)?;
    let config = PlotConfig::from_properties(&args.properties);
    tracing::debug!(?config, "plot configuration");

    let dirs = PipelineDirs {
        results_dir: args.results_dir,
        output_dir: args.output_dir,
    };

    let mut failed = Vec::new();
    for (name, result) in pipeline::generate_all(&selected, &config, &dirs) {
        match result {
            Ok(chart) => println!(
                "✓ Saved {} ({}x{})",
                chart.output_path.display(),
                chart.width,
                chart.height
            ),
            Err(e) => {
                eprintln!("✗ {}: {}", name, e);
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} chart(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
