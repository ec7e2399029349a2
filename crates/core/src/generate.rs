//! Initial layouts for a given set of dimensions.

use crate::model::{Cell, Coord, Dimensions, SeatLayout};

/// Deck letter used in generated seat codes: `A` for the lower deck,
/// `B` for anything above it.
pub fn deck_prefix(deck: usize) -> char {
    if deck == 0 { 'A' } else { 'B' }
}

/// Default code for a seat at `coord` in a grid `cols` wide.
///
/// Numbering restarts on every deck, so `A01` and `B01` coexist.
pub fn default_seat_code(coord: Coord, cols: usize) -> String {
    let seq = coord.row * cols + coord.col + 1;
    format!("{}{seq:02}", deck_prefix(coord.deck))
}

/// Every cell is a seat with its default code. Used for new buses.
pub fn default_layout(dimensions: Dimensions) -> SeatLayout {
    SeatLayout::from_fn(dimensions, |coord| {
        Cell::seat(default_seat_code(coord, dimensions.cols))
    })
}

/// Every cell is a path.
pub fn empty_layout(dimensions: Dimensions) -> SeatLayout {
    SeatLayout::from_fn(dimensions, |_| Cell::path())
}
