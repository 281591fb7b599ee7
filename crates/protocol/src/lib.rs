pub mod chart;
pub mod commands;
pub mod panel;
pub mod theme;
pub mod types;

pub use chart::{Bar, DrawableRow};
pub use commands::{RenderCommand, TextAlign};
pub use panel::{PanelEvent, PanelField};
pub use theme::ThemeToken;
pub use types::{Point, Rect};
