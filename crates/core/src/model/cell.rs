use std::fmt;

use seatplan_protocol::CellRef;
use serde::{Deserialize, Serialize};

/// One position in the bus layout.
///
/// A path cell (aisle, stairs, door) always has an empty code. A seat cell
/// is expected to carry a non-empty code; uniqueness is reported by
/// [`SeatLayout::duplicate_codes`](super::SeatLayout::duplicate_codes) but
/// not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub is_seat: bool,
    pub code: String,
}

impl Cell {
    pub fn path() -> Self {
        Self::default()
    }

    pub fn seat(code: impl Into<String>) -> Self {
        Self {
            is_seat: true,
            code: code.into(),
        }
    }

    pub fn is_path(&self) -> bool {
        !self.is_seat
    }
}

/// 0-indexed grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub deck: usize,
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(deck: usize, row: usize, col: usize) -> Self {
        Self { deck, row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.deck, self.row, self.col)
    }
}

impl From<CellRef> for Coord {
    fn from(r: CellRef) -> Self {
        Self::new(r.deck, r.row, r.col)
    }
}

impl From<Coord> for CellRef {
    fn from(c: Coord) -> Self {
        CellRef {
            deck: c.deck,
            row: c.row,
            col: c.col,
        }
    }
}
