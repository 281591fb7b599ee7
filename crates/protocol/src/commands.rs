use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core lowers a laid-out chart into a `Vec<RenderCommand>` for pixel
/// surfaces (SVG export). Renderers consume this list sequentially; each
/// command carries all the data it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle. Bars carry the index of the chart row they
    /// belong to (for hit-testing) and a hover tooltip.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        row: Option<usize>,
        tooltip: Option<String>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Begin a logical group (one chart row). Renderers may use this for
    /// batching or layer separation.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}
