use tracetree_protocol::{PanelEvent, Point};
use tracing::debug;

use crate::model::LayoutRow;

/// Visibility of the floating detail panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Hidden,
    Visible {
        /// Pointer position of the click that opened the panel.
        anchor: Point,
        content: LayoutRow,
    },
}

/// Detail-panel state machine.
///
/// ```text
///   Hidden ──bar click──▶ Visible@(x,y) showing R ──other click──▶ Hidden
///                              └──bar click──▶ Visible@(x',y') showing R'
/// ```
///
/// Every transition returns the [`PanelEvent`] a surface must apply; clicks
/// that change nothing return `None`.
#[derive(Debug, Default)]
pub struct Panel {
    state: PanelState,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PanelState::Visible { .. })
    }

    /// A bar was clicked: show its row at the pointer.
    pub fn open(&mut self, anchor: Point, content: LayoutRow) -> PanelEvent {
        debug!(pid = content.row.pid, x = anchor.x, y = anchor.y, "panel open");
        let fields = content.panel_fields();
        self.state = PanelState::Visible { anchor, content };
        PanelEvent::Open { anchor, fields }
    }

    /// A click landed outside every bar.
    pub fn dismiss(&mut self) -> Option<PanelEvent> {
        match std::mem::take(&mut self.state) {
            PanelState::Hidden => None,
            PanelState::Visible { .. } => {
                debug!("panel dismissed");
                Some(PanelEvent::Close)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use crate::model::process::from_epoch_millis;

    fn content(pid: i64) -> LayoutRow {
        let t = from_epoch_millis(0.0).expect("timestamp in range");
        LayoutRow {
            row: Row {
                pid,
                cmd: "ld".into(),
                cmdline: "/usr/bin/ld -o out".into(),
                start: t,
                end: t,
                elapsed: "0.000s".into(),
            },
            offset_px: 0.0,
            raw_width_px: 0.0,
            width_px: 4.0,
            start_label: "0.000s".into(),
            end_label: "0.000s".into(),
        }
    }

    #[test]
    fn starts_hidden() {
        assert_eq!(Panel::new().state(), &PanelState::Hidden);
    }

    #[test]
    fn open_then_dismiss_round_trip() {
        let mut panel = Panel::new();
        let ev = panel.open(Point::new(120.0, 48.0), content(77));
        assert_eq!(ev.field("pid"), Some("77"));
        assert!(matches!(ev, PanelEvent::Open { anchor, .. } if anchor == Point::new(120.0, 48.0)));
        match panel.state() {
            PanelState::Visible { anchor, content } => {
                assert_eq!(*anchor, Point::new(120.0, 48.0));
                assert_eq!(content.row.pid, 77);
            }
            PanelState::Hidden => unreachable!("panel should be visible"),
        }

        assert_eq!(panel.dismiss(), Some(PanelEvent::Close));
        assert!(!panel.is_visible());
    }

    #[test]
    fn dismiss_while_hidden_is_silent() {
        let mut panel = Panel::new();
        assert_eq!(panel.dismiss(), None);
    }

    #[test]
    fn second_bar_click_retargets() {
        let mut panel = Panel::new();
        panel.open(Point::new(1.0, 1.0), content(1));
        let ev = panel.open(Point::new(9.0, 3.0), content(2));
        assert_eq!(ev.field("pid"), Some("2"));
        assert!(matches!(
            panel.state(),
            PanelState::Visible { content, .. } if content.row.pid == 2
        ));
    }
}
