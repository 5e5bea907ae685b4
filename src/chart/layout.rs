//! Grouped bar geometry
//!
//! Group `i` is centred on x = `i`. A group of `n` bars takes `group_width`
//! of the slot, every bar is `group_width / n` wide and bar `j` sits at
//! `i + (j - (n - 1) / 2) * bar_width`.

use crate::jmh::PivotTable;
use std::ops::Range;

/// One bar in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: usize,
    pub series: usize,
    pub x0: f64,
    pub x1: f64,
    pub value: f64,
    pub error: Option<f64>,
}

impl Bar {
    pub fn center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GroupedBarLayout {
    n_categories: usize,
    n_series: usize,
    group_width: f64,
}

impl GroupedBarLayout {
    pub fn new(n_categories: usize, n_series: usize, group_width: f64) -> Self {
        Self {
            n_categories,
            n_series,
            group_width,
        }
    }

    pub fn for_pivot(pivot: &PivotTable, group_width: f64) -> Self {
        Self::new(pivot.categories().len(), pivot.series().len(), group_width)
    }

    pub fn bar_width(&self) -> f64 {
        if self.n_series == 0 {
            0.0
        } else {
            self.group_width / self.n_series as f64
        }
    }

    pub fn bar_center(&self, category: usize, series: usize) -> f64 {
        let offset = series as f64 - (self.n_series as f64 - 1.0) / 2.0;
        category as f64 + offset * self.bar_width()
    }

    /// X axis range with half a slot of padding on both sides
    pub fn x_range(&self) -> Range<f64> {
        -0.5..(self.n_categories.max(1) as f64 - 0.5)
    }

    /// Category whose tick sits at `x`, if any
    pub fn category_at(&self, x: f64) -> Option<usize> {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return None;
        }
        let index = rounded as usize;
        (index < self.n_categories).then_some(index)
    }

    /// Bars for every present cell; missing cells produce no bar
    pub fn bars(&self, pivot: &PivotTable, with_errors: bool) -> Vec<Bar> {
        let half = self.bar_width() / 2.0;
        let mut bars = Vec::new();
        for series in 0..self.n_series {
            for category in 0..self.n_categories {
                if let Some(value) = pivot.value(category, series) {
                    let center = self.bar_center(category, series);
                    bars.push(Bar {
                        category,
                        series,
                        x0: center - half,
                        x1: center + half,
                        value,
                        error: if with_errors {
                            pivot.error(category, series)
                        } else {
                            None
                        },
                    });
                }
            }
        }
        bars
    }
}

/// Y axis range: zero to the tallest bar plus 5% headroom
pub fn y_range(pivot: &PivotTable, with_errors: bool) -> Range<f64> {
    match pivot.max_value(with_errors) {
        Some(max) if max > 0.0 => 0.0..max * 1.05,
        _ => 0.0..1.0,
    }
}
