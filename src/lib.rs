//! Benchmark plotting library
//!
//! Loads JMH result files, pivots them into groups × series and renders
//! grouped bar charts as PNG images.

pub mod chart;
pub mod config;
pub mod jmh;
pub mod pipeline;
