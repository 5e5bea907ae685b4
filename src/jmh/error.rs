use thiserror::Error;

/// Errors that can occur while loading, reshaping or rendering benchmark results
#[derive(Debug, Error)]
pub enum PlotError {
    /// Reading or writing a file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Polars failed to parse or convert a table
    #[error("Table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// JSON result file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A column the chart needs is not in the result table
    #[error("Column '{0}' not found in results")]
    MissingColumn(String),

    /// A benchmark run has no value at the requested JSON path
    #[error("Run {index} has no field '{path}'")]
    MissingField { index: usize, path: String },

    /// A column has the wrong type for its role in the chart
    #[error("Column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// The result file does not have the expected shape
    #[error("Invalid result format: {0}")]
    InvalidFormat(String),

    /// Nothing left to plot
    #[error("No results to plot for chart '{0}'")]
    Empty(String),

    /// No chart definition with this name
    #[error("Unknown chart '{0}'")]
    UnknownChart(String),

    /// Plotters drawing or PNG encoding error
    #[error("Render error: {0}")]
    Render(String),

    /// Chart definitions or properties could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlotError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        PlotError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;
