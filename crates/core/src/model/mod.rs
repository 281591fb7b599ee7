pub mod process;
pub mod row;

pub use process::{ProcessNode, Timestamp};
pub use row::{Field, LayoutRow, Row};
