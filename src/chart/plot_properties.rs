//! Plot property definitions with defaults from plot.json
//!
//! plot.json is embedded at compile time and holds every property the user
//! may override with `--set name=value`, its kind, its default and (for
//! enumerated properties) the accepted values. Defaults live in that file only.

use super::properties::PropertyValue;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// plot.json embedded at compile time
const PLOT_JSON: &str = include_str!("../../plot.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from plot.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(default, rename = "values")]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PlotJson {
    properties: Vec<PropertyDef>,
}

/// Registry of all plot properties with their defaults from plot.json
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
    /// Names in file order (for listing)
    order: Vec<String>,
}

impl PropertyRegistry {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: PlotJson = serde_json::from_str(json)?;

        let order = parsed.properties.iter().map(|p| p.name.clone()).collect();
        let properties = parsed
            .properties
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Ok(Self { properties, order })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All definitions in file order
    pub fn definitions(&self) -> impl Iterator<Item = &PropertyDef> {
        self.order.iter().filter_map(|name| self.properties.get(name))
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
///
/// Panics if the embedded plot.json is malformed, which the tests below rule out.
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(PLOT_JSON).expect("embedded plot.json is invalid")
    })
}

/// Typed plot property reader
///
/// User values win when present and valid, otherwise the plot.json default is used.
pub struct PlotPropertyReader {
    user_values: HashMap<String, String>,
}

impl PlotPropertyReader {
    pub fn new(values: &[PropertyValue]) -> Self {
        let reg = registry();
        let user_values = values
            .iter()
            .filter(|p| !p.value.is_empty()) // Empty = not set
            .filter(|p| {
                let known = reg.get_property(&p.name).is_some();
                if !known {
                    tracing::warn!(property = %p.name, "ignoring unknown plot property");
                }
                known
            })
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect();

        Self { user_values }
    }

    /// Get string property (user value or default from plot.json)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user-set value if valid, otherwise the default.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.clone();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Get boolean property stored as an enumerated "true"/"false"
    pub fn get_bool(&self, name: &str) -> bool {
        self.get_enum(name).eq_ignore_ascii_case("true")
    }

    /// Get f64 property; unparsable values fall back to the default
    pub fn get_f64(&self, name: &str) -> f64 {
        let value = self.get_string(name);
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        if value.is_empty() {
            return default;
        }

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                tracing::warn!(
                    "Invalid numeric value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        if (min..=max).contains(&value) {
            value
        } else {
            tracing::warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value,
                name,
                min,
                max,
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &[&str]) -> PlotPropertyReader {
        let values: Vec<PropertyValue> = pairs
            .iter()
            .map(|p| PropertyValue::parse(p).unwrap())
            .collect();
        PlotPropertyReader::new(&values)
    }

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("plot.width").is_some());
        assert!(reg.get_property("palette").is_some());
        assert!(reg.get_property("cell.aggregation").is_some());
        assert_eq!(reg.definitions().next().unwrap().name, "plot.width");
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("plot.width"), Some("auto"));
        assert_eq!(reg.get_default("palette"), Some("Tableau10"));
        assert_eq!(reg.get_default("legend.position"), Some("upper-right"));
        assert_eq!(reg.get_default("errorbars"), Some("false"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("palette", "set1"));
        assert!(!reg.is_valid_enum_value("palette", "rainbow"));
        assert!(reg.is_valid_enum_value("plot.width", "anything"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = reader(&[]);
        assert_eq!(reader.get_enum("palette"), "Tableau10");
        assert_eq!(reader.get_f64("axis.x.tick.rotation"), 45.0);
        assert!(reader.get_bool("grid.y"));
        assert!(!reader.get_bool("errorbars"));
    }

    #[test]
    fn test_reader_user_values() {
        let reader = reader(&["palette=Set1", "errorbars=true", "axis.x.tick.rotation=0"]);
        assert_eq!(reader.get_enum("palette"), "Set1");
        assert!(reader.get_bool("errorbars"));
        assert_eq!(reader.get_f64("axis.x.tick.rotation"), 0.0);
    }

    #[test]
    fn test_reader_invalid_values_fall_back() {
        let reader = reader(&["palette=rainbow", "axis.x.tick.rotation=steep", "font.size=500"]);
        assert_eq!(reader.get_enum("palette"), "Tableau10");
        assert_eq!(reader.get_f64("axis.x.tick.rotation"), 45.0);
        assert_eq!(reader.get_f64_in_range("font.size", 6.0, 72.0), 16.0);
    }

    #[test]
    fn test_reader_ignores_unknown_and_empty() {
        let reader = reader(&["no.such.property=1", "palette="]);
        assert_eq!(reader.get_string("no.such.property"), "");
        assert_eq!(reader.get_enum("palette"), "Tableau10");
    }
}
