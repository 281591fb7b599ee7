//! Core of the tracetree timeline viewer.
//!
//! ```text
//!   JSON ──▶ ProcessNode ──▶ flatten ──▶ layout ──▶ Chart ──▶ Surface ──▶ PanelEvent
//!           (parsers)        (Row[])    (Timeline)  (views)   (click)
//! ```
//!
//! Everything up to `Chart` is a pure function of the input tree and the
//! available width. `Surface` is the only stateful piece: it holds the applied
//! chart and the detail panel.

pub mod config;
pub mod flatten;
pub mod format;
pub mod layout;
pub mod model;
pub mod panel;
pub mod parsers;
pub mod pipeline;
pub mod surface;
pub mod svg;
pub mod views;

pub use config::ChartConfig;
pub use flatten::flatten;
pub use layout::{LayoutError, Timeline, layout};
pub use model::{LayoutRow, ProcessNode, Row};
pub use panel::{Panel, PanelState};
pub use surface::Surface;
pub use views::chart::{Chart, render_chart};
