use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ChartConfig;
use crate::format::{elapsed_secs, millis_between};
use crate::model::{LayoutRow, Row, Timestamp};

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("no rows to lay out")]
    Empty,
    #[error("available width must be a positive number of pixels, got {0}")]
    InvalidWidth(f64),
}

/// Rows positioned on a linear time-to-pixel scale.
///
/// The origin is the start of the first flattened row (the root process),
/// and the root's own duration spans the full available width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub origin: Timestamp,
    /// Root duration in ms after the minimum-span clamp.
    pub span_ms: f64,
    /// Pixels per millisecond.
    pub scale: f64,
    pub available_width_px: f64,
    /// Rows in ascending start order.
    pub rows: Vec<LayoutRow>,
}

/// Lay out flattened rows with the default chart settings.
pub fn layout(rows: Vec<Row>, available_width_px: f64) -> Result<Timeline, LayoutError> {
    layout_with(rows, available_width_px, &ChartConfig::default())
}

/// Lay out flattened rows.
///
/// `rows[0]` must be the root (as produced by [`crate::flatten`]); it fixes
/// the origin and the scale before rows are re-sorted by start time.
pub fn layout_with(
    mut rows: Vec<Row>,
    available_width_px: f64,
    config: &ChartConfig,
) -> Result<Timeline, LayoutError> {
    if !(available_width_px.is_finite() && available_width_px > 0.0) {
        return Err(LayoutError::InvalidWidth(available_width_px));
    }
    let root = rows.first().ok_or(LayoutError::Empty)?;
    let origin = root.start;
    let root_span_ms = millis_between(root.start, root.end);
    let span_ms = if root_span_ms < config.min_span_ms {
        warn!(
            pid = root.pid,
            root_span_ms,
            min_span_ms = config.min_span_ms,
            "root span below minimum, clamping"
        );
        config.min_span_ms
    } else {
        root_span_ms
    };
    let scale = available_width_px / span_ms;
    debug!(
        rows = rows.len(),
        available_width_px, span_ms, scale, "laying out timeline"
    );

    // Stable: rows that start together keep their depth-first order.
    rows.sort_by_key(|r| r.start);

    let rows = rows
        .into_iter()
        .map(|row| {
            let offset_ms = millis_between(origin, row.start);
            let duration_ms = millis_between(row.start, row.end);
            let raw_width_px = duration_ms * scale;
            LayoutRow {
                offset_px: offset_ms * scale,
                raw_width_px,
                width_px: raw_width_px.max(config.min_bar_width_px),
                start_label: elapsed_secs(offset_ms),
                end_label: elapsed_secs(millis_between(origin, row.end)),
                row,
            }
        })
        .collect();

    Ok(Timeline {
        origin,
        span_ms,
        scale,
        available_width_px,
        rows,
    })
}
