use serde::{Deserialize, Serialize};

/// Resource path of the demonstration profile, relative to the page or
/// working directory that serves it.
pub const DEMO_PATH: &str = "cargo-sccache-build.json";

/// Geometry and clamping settings shared by every surface.
///
/// Units are surface pixels; the terminal surface uses one pixel per cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Width of the command-name column left of the bars.
    pub label_width_px: f64,
    pub row_height_px: f64,
    /// Bars are never narrower than this, so instant processes stay clickable.
    pub min_bar_width_px: f64,
    /// Root spans shorter than this are treated as this long.
    pub min_span_ms: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            label_width_px: 160.0,
            row_height_px: 20.0,
            min_bar_width_px: 4.0,
            min_span_ms: 1.0,
        }
    }
}

impl ChartConfig {
    /// Settings for a character-cell surface: one row per line and a label
    /// column `label_columns` wide.
    pub fn terminal(label_columns: u16) -> Self {
        Self {
            label_width_px: f64::from(label_columns),
            row_height_px: 1.0,
            ..Self::default()
        }
    }
}
