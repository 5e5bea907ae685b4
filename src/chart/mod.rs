//! Chart definitions, configuration registries and rendering
//!
//! Structure:
//! - `definitions.rs`: built-in charts (charts.json)
//! - `plot_properties.rs`: plot property registry (plot.json) and typed reader
//! - `properties.rs`: property values and plot dimensions
//! - `palettes.rs`: series palettes (palettes.json)
//! - `layout.rs`: grouped bar geometry
//! - `bar_chart.rs`: plotters rendering

pub mod bar_chart;
pub mod definitions;
pub mod layout;
pub mod palettes;
pub mod plot_properties;
pub mod properties;

pub use definitions::{builtin_charts, ChartDefinition, ChartRegistry, InputFormat};
pub use layout::GroupedBarLayout;
pub use properties::{PlotDimension, PropertyValue};
