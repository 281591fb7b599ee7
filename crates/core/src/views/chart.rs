use serde::{Deserialize, Serialize};
use tracetree_protocol::{
    Bar, DrawableRow, Point, Rect, RenderCommand, TextAlign, ThemeToken,
};
use tracing::debug;

use crate::config::ChartConfig;
use crate::flatten::flatten;
use crate::layout::{LayoutError, Timeline, layout_with};
use crate::model::{LayoutRow, ProcessNode};

const FONT_SIZE: f64 = 11.0;
const LABEL_PADDING: f64 = 4.0;
/// Bars narrower than this get no elapsed-time caption.
const MIN_CAPTION_WIDTH_PX: f64 = 48.0;

/// A fully laid-out chart: the timeline plus one drawable row per process.
///
/// `rows[i]` draws `timeline.rows[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub timeline: Timeline,
    pub rows: Vec<DrawableRow>,
}

impl Chart {
    pub fn layout_row(&self, index: usize) -> Option<&LayoutRow> {
        self.timeline.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total surface height for all rows.
    pub fn height_px(&self, config: &ChartConfig) -> f64 {
        self.rows.len() as f64 * config.row_height_px
    }

    /// Total surface width: label column plus bar column.
    pub fn width_px(&self, config: &ChartConfig) -> f64 {
        config.label_width_px + self.timeline.available_width_px
    }
}

/// Run the whole pipeline with default settings: flatten, lay out, and
/// produce drawable rows. `available_width_px` is the width of the bar
/// column.
pub fn render_chart(tree: &ProcessNode, available_width_px: f64) -> Result<Chart, LayoutError> {
    render_chart_with(tree, available_width_px, &ChartConfig::default())
}

pub fn render_chart_with(
    tree: &ProcessNode,
    available_width_px: f64,
    config: &ChartConfig,
) -> Result<Chart, LayoutError> {
    let rows = flatten(tree);
    debug!(rows = rows.len(), "flattened process tree");
    let timeline = layout_with(rows, available_width_px, config)?;
    let rows = drawable_rows(&timeline);
    Ok(Chart { timeline, rows })
}

/// One label + bar per laid-out row, top to bottom.
pub fn drawable_rows(timeline: &Timeline) -> Vec<DrawableRow> {
    timeline
        .rows
        .iter()
        .enumerate()
        .map(|(index, r)| DrawableRow {
            index,
            label: r.row.cmd.clone(),
            bar: Bar {
                offset_px: r.offset_px,
                width_px: r.width_px,
                tooltip: r.row.elapsed.clone(),
            },
        })
        .collect()
}

/// The clickable area of a row's bar in surface coordinates.
pub fn bar_rect(row: &DrawableRow, config: &ChartConfig) -> Rect {
    Rect::new(
        config.label_width_px + row.bar.offset_px,
        row.index as f64 * config.row_height_px,
        row.bar.width_px,
        config.row_height_px,
    )
}

/// Lower a chart into render commands for pixel surfaces.
pub fn render_commands(chart: &Chart, config: &ChartConfig) -> Vec<RenderCommand> {
    let width = chart.width_px(config);
    let height = chart.height_px(config);
    let mut commands = Vec::with_capacity(chart.rows.len() * 6 + 3);

    commands.push(RenderCommand::BeginGroup {
        id: "timeline".to_string(),
        label: Some("Timeline".to_string()),
    });

    for row in &chart.rows {
        let y = row.index as f64 * config.row_height_px;
        commands.push(RenderCommand::BeginGroup {
            id: format!("row-{}", row.index),
            label: Some(row.label.clone()),
        });
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, y, width, config.row_height_px),
            color: if row.index % 2 == 0 {
                ThemeToken::RowEven
            } else {
                ThemeToken::RowOdd
            },
            border_color: None,
            row: None,
            tooltip: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(LABEL_PADDING, y + config.row_height_px * 0.7),
            text: row.label.clone(),
            color: ThemeToken::LabelText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
        // Bars of processes that start before the root are clipped at the
        // label column.
        let bar = bar_rect(row, config);
        let left = bar.x.max(config.label_width_px);
        let right = bar.x + bar.w;
        if right > left {
            let visible = Rect::new(left, bar.y, right - left, bar.h);
            commands.push(RenderCommand::DrawRect {
                rect: visible,
                color: ThemeToken::BarFill,
                border_color: Some(ThemeToken::BarBorder),
                row: Some(row.index),
                tooltip: Some(row.bar.tooltip.clone()),
            });
            if visible.w >= MIN_CAPTION_WIDTH_PX {
                commands.push(RenderCommand::DrawText {
                    position: Point::new(
                        visible.x + visible.w / 2.0,
                        y + config.row_height_px * 0.7,
                    ),
                    text: row.bar.tooltip.clone(),
                    color: ThemeToken::BarText,
                    font_size: FONT_SIZE,
                    align: TextAlign::Center,
                });
            }
        }
        commands.push(RenderCommand::EndGroup);
    }

    commands.push(RenderCommand::DrawLine {
        from: Point::new(config.label_width_px, 0.0),
        to: Point::new(config.label_width_px, height),
        color: ThemeToken::Border,
        width: 1.0,
    });
    commands.push(RenderCommand::EndGroup);
    commands
}
