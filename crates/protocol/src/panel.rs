use serde::{Deserialize, Serialize};

use crate::types::Point;

/// One labelled value shown in the detail panel.
///
/// `key` names the attribute (`pid`, `cmd`, `elapsed`, ...). Surfaces look up
/// a slot by key and silently skip keys they have no slot for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelField {
    pub key: String,
    pub value: String,
}

/// Transition notifications emitted by the panel controller.
///
/// Surfaces apply these to their floating overlay; they never decide panel
/// visibility themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelEvent {
    /// Show the panel at `anchor` with the given fields.
    Open {
        anchor: Point,
        fields: Vec<PanelField>,
    },
    /// Hide the panel.
    Close,
}

impl PanelEvent {
    /// Value of the field named `key`, if this is an `Open` event carrying it.
    pub fn field(&self, key: &str) -> Option<&str> {
        match self {
            Self::Open { fields, .. } => fields
                .iter()
                .find(|f| f.key == key)
                .map(|f| f.value.as_str()),
            Self::Close => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup() {
        let ev = PanelEvent::Open {
            anchor: Point::new(3.0, 4.0),
            fields: vec![
                PanelField {
                    key: "pid".into(),
                    value: "42".into(),
                },
                PanelField {
                    key: "cmd".into(),
                    value: "cc".into(),
                },
            ],
        };
        assert_eq!(ev.field("cmd"), Some("cc"));
        assert_eq!(ev.field("missing"), None);
        assert_eq!(PanelEvent::Close.field("pid"), None);
    }

    #[test]
    fn externally_tagged_json() {
        let json = serde_json::to_string(&PanelEvent::Close).expect("serialize");
        assert_eq!(json, "\"Close\"");
    }
}
