//! Property values and plot dimensions
//!
//! Property overrides arrive on the command line as `name=value` pairs.
//! Dimensions accept either explicit pixels or "auto".

use crate::jmh::{PlotError, Result};

/// A single user-set property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub name: String,
    pub value: String,
}

impl PropertyValue {
    /// Parse `name=value`
    ///
    /// The value may itself contain `=`; only the first one splits.
    pub fn parse(pair: &str) -> Result<Self> {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            PlotError::Config(format!("expected name=value, got '{}'", pair))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PlotError::Config(format!("empty property name in '{}'", pair)));
        }
        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Plot dimension - either explicit pixels or "auto" (derived from group count)
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlotDimension {
    #[default]
    Auto,
    Pixels(u32),
}

impl PlotDimension {
    /// Parse from string property value
    ///
    /// Valid formats:
    /// - "auto" or "" (empty) → Auto
    /// - "1500" → Pixels(1500) if in valid range [100, 10000]
    pub fn from_str(value: &str, default: PlotDimension) -> Self {
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return PlotDimension::Auto;
        }

        match trimmed.parse::<u32>() {
            Ok(px) if (100..=10000).contains(&px) => PlotDimension::Pixels(px),
            Ok(px) => {
                tracing::warn!(
                    "Plot dimension {} out of valid range [100-10000], using default: {:?}",
                    px,
                    default
                );
                default
            }
            Err(_) => {
                tracing::warn!(
                    "Invalid plot dimension '{}', using default: {:?}",
                    trimmed,
                    default
                );
                default
            }
        }
    }

    /// Resolve to actual pixels
    ///
    /// For Auto: base_size (640px) + (n_groups - 1) * size_per_group (80px),
    /// capped at max_size (4000px).
    pub fn resolve(&self, n_groups: usize) -> u32 {
        match self {
            PlotDimension::Pixels(px) => *px,
            PlotDimension::Auto => {
                const BASE_SIZE: u32 = 640;
                const SIZE_PER_GROUP: u32 = 80;
                const MAX_SIZE: u32 = 4000;

                let extra = (n_groups.saturating_sub(1) as u32).saturating_mul(SIZE_PER_GROUP);
                BASE_SIZE.saturating_add(extra).min(MAX_SIZE)
            }
        }
    }
}
