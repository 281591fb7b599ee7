use serde::{Deserialize, Serialize};
use tracetree_protocol::PanelField;

use super::Timestamp;

/// Display-ready record for one process, produced by [`crate::flatten`].
///
/// Rows own all their data; they hold no references back into the tree they
/// came from, so they can be sorted and kept independently of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub pid: i64,
    /// Final path segment of argv[0], or `<unknown>`.
    pub cmd: String,
    /// Full argv joined with spaces.
    pub cmdline: String,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Duration formatted as seconds, e.g. `1.500s`.
    pub elapsed: String,
}

/// A [`Row`] positioned on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub row: Row,
    pub offset_px: f64,
    /// Width before the minimum-width floor is applied.
    pub raw_width_px: f64,
    pub width_px: f64,
    /// Start relative to the timeline origin, e.g. `0.250s`.
    pub start_label: String,
    /// End relative to the timeline origin.
    pub end_label: String,
}

/// The named attributes a detail panel can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pid,
    Cmd,
    Cmdline,
    Start,
    End,
    Elapsed,
    StartPretty,
    EndPretty,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Pid,
        Field::Cmd,
        Field::Cmdline,
        Field::Start,
        Field::End,
        Field::Elapsed,
        Field::StartPretty,
        Field::EndPretty,
    ];

    /// Slot name used by panel markup (`panel-<key>`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Cmd => "cmd",
            Self::Cmdline => "cmdline",
            Self::Start => "start",
            Self::End => "end",
            Self::Elapsed => "elapsed",
            Self::StartPretty => "startpretty",
            Self::EndPretty => "endpretty",
        }
    }
}

impl LayoutRow {
    /// Text for one attribute.
    pub fn field(&self, field: Field) -> String {
        match field {
            Field::Pid => self.row.pid.to_string(),
            Field::Cmd => self.row.cmd.clone(),
            Field::Cmdline => self.row.cmdline.clone(),
            Field::Start => self.row.start.to_rfc3339(),
            Field::End => self.row.end.to_rfc3339(),
            Field::Elapsed => self.row.elapsed.clone(),
            Field::StartPretty => self.start_label.clone(),
            Field::EndPretty => self.end_label.clone(),
        }
    }

    /// Every attribute, keyed for the detail panel.
    pub fn panel_fields(&self) -> Vec<PanelField> {
        Field::ALL
            .iter()
            .map(|&f| PanelField {
                key: f.key().to_string(),
                value: self.field(f),
            })
            .collect()
    }
}
