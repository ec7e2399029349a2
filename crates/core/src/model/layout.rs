use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cell::{Cell, Coord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("cell {coord} is outside a {dimensions} layout")]
    OutOfBounds { coord: Coord, dimensions: Dimensions },
    #[error("cell {0} is a path, only seats carry a code")]
    NotASeat(Coord),
    #[error("seat code for cell {0} must not be blank")]
    EmptyCode(Coord),
    #[error("{dimensions} is outside the allowed range ({limits})")]
    DimensionsOutOfRange {
        dimensions: Dimensions,
        limits: LayoutLimits,
    },
}

/// Size of a layout: decks × rows × columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub decks: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Dimensions {
    pub const fn new(decks: usize, rows: usize, cols: usize) -> Self {
        Self { decks, rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.decks * self.rows * self.cols
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.deck < self.decks && coord.row < self.rows && coord.col < self.cols
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.decks, self.rows, self.cols)
    }
}

/// Bounds accepted for a freshly configured layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutLimits {
    pub min_decks: usize,
    pub max_decks: usize,
    pub min_rows: usize,
    pub max_rows: usize,
    pub min_cols: usize,
    pub max_cols: usize,
}

impl Default for LayoutLimits {
    fn default() -> Self {
        Self {
            min_decks: 1,
            max_decks: 2,
            min_rows: 2,
            max_rows: 12,
            min_cols: 2,
            max_cols: 5,
        }
    }
}

impl LayoutLimits {
    /// Validate dimensions entered for a new layout. Every axis needs at
    /// least one cell whatever the minimums say.
    pub fn check(&self, dimensions: Dimensions) -> Result<(), LayoutError> {
        let ok = (self.min_decks.max(1)..=self.max_decks).contains(&dimensions.decks)
            && (self.min_rows.max(1)..=self.max_rows).contains(&dimensions.rows)
            && (self.min_cols.max(1)..=self.max_cols).contains(&dimensions.cols);
        if ok {
            Ok(())
        } else {
            Err(LayoutError::DimensionsOutOfRange {
                dimensions,
                limits: *self,
            })
        }
    }

    /// Every minimum is at least 1 and no larger than its maximum.
    pub fn is_consistent(&self) -> bool {
        [
            (self.min_decks, self.max_decks),
            (self.min_rows, self.max_rows),
            (self.min_cols, self.max_cols),
        ]
        .iter()
        .all(|&(min, max)| min >= 1 && min <= max)
    }

    /// Largest layout these limits allow.
    pub fn max_dimensions(&self) -> Dimensions {
        Dimensions::new(self.max_decks, self.max_rows, self.max_cols)
    }
}

impl fmt::Display for LayoutLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "decks {}-{}, rows {}-{}, cols {}-{}",
            self.min_decks,
            self.max_decks,
            self.min_rows,
            self.max_rows,
            self.min_cols,
            self.max_cols
        )
    }
}

/// The 3D seat grid, indexed `[deck][row][col]`.
///
/// Cells are stored flat in deck-major, row, column order, which is also
/// the iteration and serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatLayout {
    dimensions: Dimensions,
    cells: Vec<Cell>,
}

impl SeatLayout {
    /// Build a layout by calling `f` for every coordinate in deck-major order.
    pub fn from_fn(dimensions: Dimensions, mut f: impl FnMut(Coord) -> Cell) -> Self {
        let mut cells = Vec::with_capacity(dimensions.cell_count());
        for deck in 0..dimensions.decks {
            for row in 0..dimensions.rows {
                for col in 0..dimensions.cols {
                    cells.push(f(Coord::new(deck, row, col)));
                }
            }
        }
        Self { dimensions, cells }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub(crate) fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index(coord).map(|i| &mut self.cells[i])
    }

    /// Like [`get`](Self::get) but reports the failing coordinate.
    pub fn cell(&self, coord: Coord) -> Result<&Cell, LayoutError> {
        self.get(coord).ok_or(LayoutError::OutOfBounds {
            coord,
            dimensions: self.dimensions,
        })
    }

    /// All cells with their coordinates, deck-major then row then column.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        let Dimensions { rows, cols, .. } = self.dimensions;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let deck = i / (rows * cols);
            let row = (i / cols) % rows;
            let col = i % cols;
            (Coord::new(deck, row, col), cell)
        })
    }

    /// Cells of one row, left to right.
    pub fn row(&self, deck: usize, row: usize) -> Option<&[Cell]> {
        let start = self.index(Coord::new(deck, row, 0))?;
        Some(&self.cells[start..start + self.dimensions.cols])
    }

    pub fn seat_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_seat).count()
    }

    /// Seat codes used by more than one seat, with every coordinate using them.
    pub fn duplicate_codes(&self) -> BTreeMap<String, Vec<Coord>> {
        let mut by_code: BTreeMap<String, Vec<Coord>> = BTreeMap::new();
        for (coord, cell) in self.cells() {
            if cell.is_seat && !cell.code.is_empty() {
                by_code.entry(cell.code.clone()).or_default().push(coord);
            }
        }
        by_code.retain(|_, coords| coords.len() > 1);
        by_code
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.dimensions.contains(coord) {
            return None;
        }
        let Dimensions { rows, cols, .. } = self.dimensions;
        Some((coord.deck * rows + coord.row) * cols + coord.col)
    }
}
