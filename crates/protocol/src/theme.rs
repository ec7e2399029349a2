use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Cells
    SeatFill,
    SeatText,
    PathFill,
    PathBorder,

    DeckHeaderText,

    /// Cell under the cursor.
    HoverHighlight,
    /// Cell currently open in the code editor.
    SelectionHighlight,

    Background,
}
