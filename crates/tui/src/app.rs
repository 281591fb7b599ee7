use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use tracetree_core::pipeline::{Loader, Source, TreeReady};
use tracetree_core::views::chart::render_chart_with;
use tracetree_core::{ChartConfig, PanelState, ProcessNode, Surface};
use tracetree_protocol::{PanelEvent, Point};
use tracing::{debug, error, info};

/// Width of the command-name column, in cells.
pub const LABEL_COLUMNS: u16 = 16;

/// Lines taken by the header and status bar.
const CHROME_LINES: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading(String),
    Showing(String),
    Failed(String),
}

/// Viewer state: the surface, the background loader, and what the user sees
/// around the chart.
pub struct App {
    surface: Surface,
    loader: Loader,
    file: Option<PathBuf>,
    /// Last tree that laid out cleanly; re-laid out when the terminal resizes.
    tree: Option<ProcessNode>,
    status: Status,
    scroll: usize,
    width: u16,
    height: u16,
    should_quit: bool,
}

impl App {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            surface: Surface::new(ChartConfig::terminal(LABEL_COLUMNS)),
            loader: Loader::new(),
            file,
            tree: None,
            status: Status::Idle,
            scroll: 0,
            width: 0,
            height: 0,
            should_quit: false,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Number of chart rows that fit between header and status bar.
    pub fn visible_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_LINES))
    }

    /// Width of the bar column, in cells.
    fn bar_columns(&self) -> u16 {
        self.width.saturating_sub(LABEL_COLUMNS).max(1)
    }

    /// Start loading `source` in the background.
    pub fn request(&mut self, source: Source) {
        self.status = Status::Loading(source.to_string());
        self.loader.request(source);
    }

    /// Reload the file given on the command line, if any.
    pub fn reload(&mut self) {
        match self.file.clone() {
            Some(path) => self.request(Source::File(path)),
            None => debug!("no profile file to reload"),
        }
    }

    /// Apply any finished load. Returns whether something changed.
    pub fn poll_loads(&mut self) -> bool {
        match self.loader.try_next() {
            Some(ready) => {
                self.on_tree_ready(ready);
                true
            }
            None => false,
        }
    }

    fn on_tree_ready(&mut self, ready: TreeReady) {
        match ready.tree {
            Ok(tree) => self.show_tree(tree, ready.source.to_string()),
            Err(e) => {
                error!(source = %ready.source, "load failed: {e}");
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    /// Lay out `tree` at the current width and swap it in. On failure the
    /// previous chart stays on screen.
    pub fn show_tree(&mut self, tree: ProcessNode, label: String) {
        match render_chart_with(
            &tree,
            f64::from(self.bar_columns()),
            self.surface.config(),
        ) {
            Ok(chart) => {
                info!(processes = chart.len(), source = %label, "showing process tree");
                self.surface.apply(chart);
                self.tree = Some(tree);
                self.scroll = 0;
                self.status = Status::Showing(label);
            }
            Err(e) => {
                error!("layout failed: {e}");
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    /// Record the terminal size; a new width re-lays out the current tree.
    pub fn resize(&mut self, width: u16, height: u16) {
        let relayout = width != self.width;
        self.width = width;
        self.height = height;
        self.clamp_scroll();
        if relayout && let Some(tree) = self.tree.take() {
            let label = match &self.status {
                Status::Showing(label) => label.clone(),
                _ => String::new(),
            };
            let status = self.status.clone();
            self.show_tree(tree, label);
            // A resize is not a new load; keep whatever the status line said.
            self.status = status;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.surface.dismiss();
            }
            KeyCode::Char('d') => self.request(Source::Demo),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-(self.visible_rows() as isize)),
            KeyCode::PageDown => self.scroll_by(self.visible_rows() as isize),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.click_at(mouse.column, mouse.row);
            }
            MouseEventKind::ScrollDown => self.scroll_by(3),
            MouseEventKind::ScrollUp => self.scroll_by(-3),
            _ => {}
        }
    }

    /// A left click on terminal cell (`column`, `row`). Clicks on the header
    /// or status bar only dismiss the panel.
    pub fn click_at(&mut self, column: u16, row: u16) -> Option<PanelEvent> {
        match self.cell_to_point(column, row) {
            Some(at) => self.surface.click(at),
            None => self.surface.dismiss(),
        }
    }

    /// Centre of a terminal cell in surface coordinates, if the cell lies in
    /// the chart area.
    pub fn cell_to_point(&self, column: u16, row: u16) -> Option<Point> {
        let line = usize::from(row.checked_sub(1)?);
        if line >= self.visible_rows() {
            return None;
        }
        Some(Point::new(
            f64::from(column) + 0.5,
            (line + self.scroll) as f64 + 0.5,
        ))
    }

    /// The panel's anchor as a terminal cell, if the panel is open and its
    /// anchor row is scrolled into view.
    pub fn panel_cell(&self) -> Option<(u16, u16)> {
        let PanelState::Visible { anchor, .. } = self.surface.panel() else {
            return None;
        };
        let line = (anchor.y.floor() as usize).checked_sub(self.scroll)?;
        if line >= self.visible_rows() {
            return None;
        }
        let row = u16::try_from(line).ok()?.saturating_add(1);
        Some((anchor.x.floor() as u16, row))
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max = self
            .surface
            .rows()
            .len()
            .saturating_sub(self.visible_rows());
        self.scroll = self.scroll.min(max);
    }
}
