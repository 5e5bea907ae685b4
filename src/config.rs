//! Plot configuration from plot properties
//!
//! Configuration is loaded from plot properties (defined in plot.json) with
//! optional `--set name=value` overrides. All default values come from
//! plot.json via `PlotPropertyReader`.

use crate::chart::plot_properties::PlotPropertyReader;
use crate::chart::properties::{PlotDimension, PropertyValue};
use crate::jmh::CellAggregation;

/// Where the legend goes inside the plot area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
    MiddleRight,
    None,
}

impl LegendPosition {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "upper-left" => Self::UpperLeft,
            "lower-right" => Self::LowerRight,
            "lower-left" => Self::LowerLeft,
            "middle-right" => Self::MiddleRight,
            "none" => Self::None,
            _ => Self::UpperRight,
        }
    }

    /// Top-left pixel of a legend box of `size` inside an area of `area`
    /// pixels, `margin` pixels from the edges. None when the legend is hidden.
    pub fn legend_origin(
        self,
        area: (u32, u32),
        size: (u32, u32),
        margin: u32,
    ) -> Option<(i32, i32)> {
        let (area_w, area_h) = (area.0 as i32, area.1 as i32);
        let (w, h) = (size.0 as i32, size.1 as i32);
        let m = margin as i32;
        let right = area_w - w - m;
        let bottom = area_h - h - m;
        match self {
            Self::UpperRight => Some((right, m)),
            Self::UpperLeft => Some((m, m)),
            Self::LowerRight => Some((right, bottom)),
            Self::LowerLeft => Some((m, bottom)),
            Self::MiddleRight => Some((right, (area_h - h) / 2)),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Image width (pixels or Auto)
    pub plot_width: PlotDimension,

    /// Image height (pixels or Auto)
    pub plot_height: PlotDimension,

    /// Categorical palette for the series
    pub palette: String,

    pub legend_position: LegendPosition,

    /// Category label rotation in degrees (0 = horizontal)
    ///
    /// Plotters only rotates text by quarter turns, so any non-zero value
    /// draws the labels vertically.
    pub x_tick_rotation: f64,

    /// How to combine several results in the same cell
    pub cell_aggregation: CellAggregation,

    /// Draw score error whiskers
    pub error_bars: bool,

    /// Draw horizontal grid lines
    pub y_grid: bool,

    /// Tick label font size; the title is 1.5x, axis labels 1.125x
    pub font_size: f64,
}

impl PlotConfig {
    /// Create config from plot properties
    ///
    /// # Arguments
    /// * `overrides` - user-set values; invalid ones fall back to the defaults
    pub fn from_properties(overrides: &[PropertyValue]) -> Self {
        let props = PlotPropertyReader::new(overrides);

        let plot_width =
            PlotDimension::from_str(&props.get_string("plot.width"), PlotDimension::Auto);
        let plot_height = PlotDimension::from_str(
            &props.get_string("plot.height"),
            PlotDimension::Pixels(600),
        );

        let palette = props.get_enum("palette");
        let legend_position = LegendPosition::parse(&props.get_enum("legend.position"));
        let x_tick_rotation = props.get_f64_in_range("axis.x.tick.rotation", -360.0, 360.0);
        let cell_aggregation = CellAggregation::parse(&props.get_enum("cell.aggregation"));
        let error_bars = props.get_bool("errorbars");
        let y_grid = props.get_bool("grid.y");
        let font_size = props.get_f64_in_range("font.size", 6.0, 72.0);

        Self {
            plot_width,
            plot_height,
            palette,
            legend_position,
            x_tick_rotation,
            cell_aggregation,
            error_bars,
            y_grid,
            font_size,
        }
    }

    /// Resolve image dimensions to pixels for a chart with `n_groups` x positions
    pub fn resolve_dimensions(&self, n_groups: usize) -> (u32, u32) {
        (
            self.plot_width.resolve(n_groups),
            self.plot_height.resolve(1),
        )
    }

    /// Whether category labels are drawn vertically
    pub fn rotate_x_labels(&self) -> bool {
        self.x_tick_rotation.rem_euclid(180.0) != 0.0
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::from_properties(&[])
    }
}
