use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a cell click is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolMode {
    /// Paint the cell as a seat, keeping any existing code.
    #[default]
    Seat,
    /// Paint the cell as a path, clearing its code.
    Path,
    /// Open the code editor on seat cells.
    Edit,
}

impl ToolMode {
    pub const ALL: [ToolMode; 3] = [ToolMode::Path, ToolMode::Seat, ToolMode::Edit];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolMode::Seat => "SEAT",
            ToolMode::Path => "PATH",
            ToolMode::Edit => "EDIT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolMode::Seat => "Seat",
            ToolMode::Path => "Path",
            ToolMode::Edit => "Edit Code",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEAT" => Ok(ToolMode::Seat),
            "PATH" => Ok(ToolMode::Path),
            "EDIT" => Ok(ToolMode::Edit),
            _ => Err(format!("unknown tool mode: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("seat".parse::<ToolMode>(), Ok(ToolMode::Seat));
        assert_eq!("PATH".parse::<ToolMode>(), Ok(ToolMode::Path));
        assert_eq!("Edit".parse::<ToolMode>(), Ok(ToolMode::Edit));
        assert!("paint".parse::<ToolMode>().is_err());
    }

    #[test]
    fn default_is_seat() {
        assert_eq!(ToolMode::default(), ToolMode::Seat);
    }
}
