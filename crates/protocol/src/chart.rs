use serde::{Deserialize, Serialize};

/// Horizontal geometry of one timeline bar, relative to the start of the
/// bar column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub offset_px: f64,
    pub width_px: f64,
    /// Text shown on hover (the process's elapsed time).
    pub tooltip: String,
}

/// One line of the chart table: a label cell and a bar cell.
///
/// `index` is the row's position in the laid-out timeline, which is also its
/// top-to-bottom position on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableRow {
    pub index: usize,
    pub label: String,
    pub bar: Bar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_field_names() {
        let row = DrawableRow {
            index: 2,
            label: "rustc".into(),
            bar: Bar {
                offset_px: 12.5,
                width_px: 4.0,
                tooltip: "0.001s".into(),
            },
        };
        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["label"], "rustc");
        assert_eq!(json["bar"]["width_px"], 4.0);
        assert_eq!(json["bar"]["tooltip"], "0.001s");
    }
}
