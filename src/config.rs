//! Layout configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Geometry and styling constants used by the layout engine.
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Outer padding applied after normalization.
    pub padding_x: f64,
    pub padding_y: f64,
    /// Gap between neighbouring tables during initial placement.
    pub gap_x: f64,
    /// Gap between layers.
    pub gap_y: f64,
    /// Minimum horizontal gap enforced by overlap resolution.
    pub min_gap: f64,

    pub header_height: f64,
    pub row_height: f64,
    /// Extra height below the last row.
    pub table_padding: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub header_margin: f64,
    pub row_margin: f64,
    /// Added to the widest line before clamping.
    pub width_padding: f64,

    pub relaxation_passes: usize,
    pub forward_pull: f64,
    pub backward_pull: f64,

    pub header_font: String,
    pub column_font: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding_x: 80.0,
            padding_y: 70.0,
            gap_x: 120.0,
            gap_y: 90.0,
            min_gap: 50.0,
            header_height: 36.0,
            row_height: 26.0,
            table_padding: 8.0,
            min_width: 240.0,
            max_width: 380.0,
            header_margin: 60.0,
            row_margin: 40.0,
            width_padding: 30.0,
            relaxation_passes: 4,
            forward_pull: 0.5,
            backward_pull: 0.3,
            header_font: r#"bold 13px "Segoe UI", system-ui, sans-serif"#.to_string(),
            column_font: r#"12px "Cascadia Code", "Fira Code", Consolas, monospace"#.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LayoutConfig::from_toml_str("gap_x = 40.0\nrelaxation_passes = 0\n").unwrap();
        assert_eq!(config.gap_x, 40.0);
        assert_eq!(config.relaxation_passes, 0);
        assert_eq!(config.gap_y, LayoutConfig::default().gap_y);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = LayoutConfig::from_toml_str("gap_x = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
