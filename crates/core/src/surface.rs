use tracetree_protocol::{DrawableRow, PanelEvent, Point};
use tracing::{debug, info};

use crate::config::ChartConfig;
use crate::panel::{Panel, PanelState};
use crate::views::chart::{Chart, bar_rect};

/// The single rendering surface: the currently applied chart plus the
/// detail panel floating over it.
///
/// Charts are computed elsewhere and swapped in whole by [`Surface::apply`],
/// so a failed load never leaves a half-updated table behind.
#[derive(Debug)]
pub struct Surface {
    config: ChartConfig,
    chart: Option<Chart>,
    panel: Panel,
}

impl Surface {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            chart: None,
            panel: Panel::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn rows(&self) -> &[DrawableRow] {
        self.chart
            .as_ref()
            .map(|c| c.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn panel(&self) -> &PanelState {
        self.panel.state()
    }

    /// Replace the displayed chart. The old rows (and any panel showing one
    /// of them) go away together; returns `Close` if the panel was open.
    pub fn apply(&mut self, chart: Chart) -> Option<PanelEvent> {
        info!(rows = chart.rows.len(), "applying chart");
        self.chart = Some(chart);
        self.panel.dismiss()
    }

    /// Index of the bar under `at`, if any.
    pub fn hit_test(&self, at: Point) -> Option<usize> {
        let chart = self.chart.as_ref()?;
        // Bars of processes that start before the root reach left of the bar
        // column; that part is clipped and belongs to the label.
        if self.config.row_height_px <= 0.0 || at.y < 0.0 || at.x < self.config.label_width_px {
            return None;
        }
        // Rows are stacked at a fixed pitch, so only one can be under `at`.
        let index = (at.y / self.config.row_height_px).floor() as usize;
        let row = chart.rows.get(index)?;
        bar_rect(row, &self.config)
            .contains(at)
            .then_some(row.index)
    }

    /// Route a click at `at`: a bar opens the panel and absorbs the click,
    /// anything else dismisses it.
    pub fn click(&mut self, at: Point) -> Option<PanelEvent> {
        match self.hit_test(at) {
            Some(index) => self.bar_clicked(index, at),
            None => self.dismiss(),
        }
    }

    /// A bar's own click handler fired (the surface did its own hit-testing).
    pub fn bar_clicked(&mut self, index: usize, at: Point) -> Option<PanelEvent> {
        let content = self.chart.as_ref()?.layout_row(index)?.clone();
        debug!(index, pid = content.row.pid, "bar clicked");
        Some(self.panel.open(at, content))
    }

    /// A click that no bar absorbed.
    pub fn dismiss(&mut self) -> Option<PanelEvent> {
        self.panel.dismiss()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessNode;
    use crate::model::process::from_epoch_millis;
    use crate::views::chart::render_chart_with;

    fn node(pid: i64, start: f64, end: f64, children: Vec<ProcessNode>) -> ProcessNode {
        ProcessNode {
            pid,
            cmdline: vec![format!("/bin/p{pid}")],
            started: from_epoch_millis(start).expect("timestamp in range"),
            ended: from_epoch_millis(end).expect("timestamp in range"),
            children,
        }
    }

    fn cfg() -> ChartConfig {
        ChartConfig {
            label_width_px: 100.0,
            row_height_px: 20.0,
            ..ChartConfig::default()
        }
    }

    fn surface() -> Surface {
        let tree = node(1, 0.0, 1000.0, vec![node(2, 500.0, 500.0, vec![])]);
        let mut s = Surface::new(cfg());
        let chart = render_chart_with(&tree, 1000.0, &cfg()).expect("chart");
        s.apply(chart);
        s
    }

    #[test]
    fn empty_surface_ignores_clicks() {
        let mut s = Surface::new(cfg());
        assert!(s.rows().is_empty());
        assert_eq!(s.click(Point::new(150.0, 5.0)), None);
        assert_eq!(s.panel(), &PanelState::Hidden);
    }

    #[test]
    fn hit_test_uses_bar_geometry() {
        let s = surface();
        // Row 0 bar spans x 100..1100.
        assert_eq!(s.hit_test(Point::new(100.0, 0.0)), Some(0));
        assert_eq!(s.hit_test(Point::new(50.0, 10.0)), None);
        // Row 1 is a zero-length process floored to 4px at x 600..604.
        assert_eq!(s.hit_test(Point::new(601.0, 25.0)), Some(1));
        assert_eq!(s.hit_test(Point::new(605.0, 25.0)), None);
        assert_eq!(s.hit_test(Point::new(601.0, 45.0)), None);
        assert_eq!(s.hit_test(Point::new(601.0, -1.0)), None);
    }

    #[test]
    fn early_bar_is_clipped_at_label_column() {
        // pid 2 starts 500ms before the root, so its bar spans x -400..600.
        let tree = node(1, 500.0, 1500.0, vec![node(2, 0.0, 1000.0, vec![])]);
        let mut s = Surface::new(cfg());
        s.apply(render_chart_with(&tree, 1000.0, &cfg()).expect("chart"));
        assert_eq!(s.rows()[0].index, 0);
        assert_eq!(s.hit_test(Point::new(50.0, 5.0)), None);
        assert_eq!(s.hit_test(Point::new(150.0, 5.0)), Some(0));
        assert_eq!(s.click(Point::new(50.0, 5.0)), None);
        assert_eq!(s.panel(), &PanelState::Hidden);
    }

    #[test]
    fn click_bar_then_background() {
        let mut s = surface();
        let at = Point::new(602.0, 30.0);
        let opened = s.click(at).expect("open event");
        assert_eq!(opened.field("pid"), Some("2"));
        assert_eq!(opened.field("cmd"), Some("p2"));
        assert!(matches!(
            s.panel(),
            PanelState::Visible { anchor, content } if *anchor == at && content.row.pid == 2
        ));

        assert_eq!(s.click(Point::new(10.0, 10.0)), Some(PanelEvent::Close));
        assert_eq!(s.panel(), &PanelState::Hidden);
        assert_eq!(s.click(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn apply_discards_panel() {
        let mut s = surface();
        s.click(Point::new(150.0, 5.0));
        let chart = s.chart().cloned().expect("chart");
        assert_eq!(s.apply(chart), Some(PanelEvent::Close));
        assert_eq!(s.panel(), &PanelState::Hidden);
    }

    #[test]
    fn bar_clicked_out_of_range() {
        let mut s = surface();
        assert_eq!(s.bar_clicked(9, Point::new(0.0, 0.0)), None);
        assert_eq!(s.panel(), &PanelState::Hidden);
    }
}
