use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Border,

    // Chart rows
    RowEven,
    RowOdd,
    LabelText,
    BarFill,
    BarBorder,
    BarText,

    // Detail panel
    PanelBackground,
    PanelBorder,
    PanelKey,
    PanelText,

    // Header / status line
    HeaderBackground,
    HeaderText,
    TextMuted,
    ErrorText,
}
