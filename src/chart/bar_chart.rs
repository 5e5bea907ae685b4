//! Grouped bar chart rendering with plotters
//!
//! `render` draws on any plotters drawing area so the same code produces the
//! PNG output and the SVG used in tests. `render_png` wraps it with a
//! `BitMapBackend` and writes the file.

use super::definitions::ChartDefinition;
use super::layout::{y_range, GroupedBarLayout};
use super::palettes::series_color;
use crate::config::{LegendPosition, PlotConfig};
use crate::jmh::{PivotTable, PlotError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const FONT_FAMILY: &str = "sans-serif";

const LEGEND_MARGIN: u32 = 10;
const LEGEND_PADDING: i32 = 8;
const LEGEND_MARKER: i32 = 14;

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Whether a system font can be loaded for text layout
pub fn font_available() -> bool {
    (FONT_FAMILY, 12.0).into_font().box_size("0").is_ok()
}

/// Height of the x label area, enough for vertical labels when rotated
fn x_label_area_size(pivot: &PivotTable, config: &PlotConfig) -> u32 {
    let font = config.font_size;
    if config.rotate_x_labels() {
        let longest = pivot
            .categories()
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        (longest as f64 * font * 0.6 + font) as u32
    } else {
        (font * 2.5) as u32
    }
}

/// Draw a grouped bar chart of `pivot` onto `root`
pub fn render<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    pivot: &PivotTable,
    chart: &ChartDefinition,
    config: &PlotConfig,
) -> Result<()> {
    let with_errors = config.error_bars && chart.error.is_some();
    let layout = GroupedBarLayout::for_pivot(pivot, chart.group_width);
    let font = config.font_size;

    if !font_available() {
        return Err(PlotError::Render(format!(
            "no system font found for '{}'",
            FONT_FAMILY
        )));
    }

    root.fill(&WHITE).map_err(render_err)?;

    // Ticks land on integers, one per group; category_at labels them
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT_FAMILY, font * 1.5).into_font())
        .margin(20)
        .x_label_area_size(x_label_area_size(pivot, config))
        .y_label_area_size((font * 5.0) as u32)
        .build_cartesian_2d(layout.x_range(), y_range(pivot, with_errors))
        .map_err(render_err)?;

    let x_label_font = if config.rotate_x_labels() {
        (FONT_FAMILY, font)
            .into_font()
            .transform(FontTransform::Rotate90)
    } else {
        (FONT_FAMILY, font).into_font()
    };
    let label_category = |x: &f64| {
        layout
            .category_at(*x)
            .and_then(|i| pivot.categories().get(i).cloned())
            .unwrap_or_default()
    };

    let mut mesh = ctx.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(pivot.categories().len().max(1))
        .x_label_formatter(&label_category)
        .x_label_style(x_label_font)
        .y_label_style((FONT_FAMILY, font).into_font())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style((FONT_FAMILY, font * 1.125).into_font())
        .bold_line_style(&BLACK.mix(0.12))
        .light_line_style(&TRANSPARENT);
    if !config.y_grid {
        mesh.disable_y_mesh();
    }
    mesh.draw().map_err(render_err)?;

    let bars = layout.bars(pivot, with_errors);
    let mut legend_entries = Vec::with_capacity(pivot.series().len());

    for (series, name) in pivot.series().iter().enumerate() {
        let [r, g, b] = series_color(&config.palette, series);
        let color = RGBColor(r, g, b);
        legend_entries.push((name.as_str(), color));

        let series_bars = bars.iter().filter(|bar| bar.series == series);
        ctx.draw_series(series_bars.map(|bar| {
            Rectangle::new([(bar.x0, 0.0), (bar.x1, bar.value)], color.filled())
        }))
        .map_err(render_err)?;
    }

    if with_errors {
        let cap = layout.bar_width() * 0.15;
        for bar in bars.iter() {
            let Some(err) = bar.error else { continue };
            let c = bar.center();
            let (lo, hi) = ((bar.value - err).max(0.0), bar.value + err);
            ctx.draw_series([
                PathElement::new(vec![(c, lo), (c, hi)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c - cap, hi), (c + cap, hi)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c - cap, lo), (c + cap, lo)], BLACK.stroke_width(1)),
            ])
            .map_err(render_err)?;
        }
    }

    draw_legend(
        &ctx.plotting_area().strip_coord_spec(),
        chart.legend_title.as_deref(),
        &legend_entries,
        config.legend_position,
        font,
    )
}

/// Draw the legend box in pixel coordinates of the plot area
///
/// The title, when set, is a centred header above the entries.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: Option<&str>,
    entries: &[(&str, RGBColor)],
    position: LegendPosition,
    font: f64,
) -> Result<()> {
    if position == LegendPosition::None || entries.is_empty() {
        return Ok(());
    }

    let style = TextStyle::from((FONT_FAMILY, font).into_font());
    let text_size = |text: &str| area.estimate_text_size(text, &style).map_err(render_err);

    let (title_w, mut text_h) = match title {
        Some(title) => text_size(title)?,
        None => (0, 0),
    };
    let mut label_w = 0;
    for (label, _) in entries {
        let (w, h) = text_size(label)?;
        label_w = label_w.max(w);
        text_h = text_h.max(h);
    }

    let pad = LEGEND_PADDING;
    let text_h = text_h as i32;
    let row_h = text_h + 4;
    let rows = entries.len() as i32 + i32::from(title.is_some());
    let width = (title_w as i32).max(LEGEND_MARKER + pad + label_w as i32) + 2 * pad;
    let height = rows * row_h + 2 * pad;

    let Some((x, y)) = position.legend_origin(
        area.dim_in_pixel(),
        (width as u32, height as u32),
        LEGEND_MARGIN,
    ) else {
        return Ok(());
    };

    let frame = [(x, y), (x + width, y + height)];
    area.draw(&Rectangle::new(frame, WHITE.mix(0.8).filled()))
        .map_err(render_err)?;
    area.draw(&Rectangle::new(frame, BLACK.stroke_width(1)))
        .map_err(render_err)?;

    let mut row_y = y + pad;
    if let Some(title) = title {
        let title_x = x + (width - title_w as i32) / 2;
        area.draw(&Text::new(title.to_string(), (title_x, row_y), style.clone()))
            .map_err(render_err)?;
        row_y += row_h;
    }

    for (label, color) in entries {
        let mid = row_y + text_h / 2;
        let marker_x = x + pad;
        area.draw(&Rectangle::new(
            [(marker_x, mid - 6), (marker_x + LEGEND_MARKER, mid + 6)],
            color.filled(),
        ))
        .map_err(render_err)?;
        let label_x = marker_x + LEGEND_MARKER + pad;
        area.draw(&Text::new(label.to_string(), (label_x, row_y), style.clone()))
            .map_err(render_err)?;
        row_y += row_h;
    }

    Ok(())
}

/// Render the chart into a PNG file of `size` pixels
pub fn render_png(
    path: &Path,
    size: (u32, u32),
    pivot: &PivotTable,
    chart: &ChartDefinition,
    config: &PlotConfig,
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    render(&root, pivot, chart, config)?;
    root.present().map_err(render_err)?;
    Ok(())
}
