//! Converting a grid to the backend's seat list.

use seatplan_protocol::{SaveSeatMapRequest, SeatDefinition};

use crate::model::SeatLayout;

/// One definition per seat cell, deck-major then row then column.
/// Coordinates are 1-indexed; path cells are omitted.
pub fn seat_definitions(layout: &SeatLayout) -> Vec<SeatDefinition> {
    layout
        .cells()
        .filter(|(_, cell)| cell.is_seat)
        .map(|(coord, cell)| SeatDefinition {
            seat_code: cell.code.clone(),
            row: one_based(coord.row),
            col: one_based(coord.col),
            deck: one_based(coord.deck),
            is_available: true,
        })
        .collect()
}

/// Capacity of a bus built from this layout.
pub fn total_seats(layout: &SeatLayout) -> usize {
    layout.seat_count()
}

pub fn save_request(bus_id: impl Into<String>, layout: &SeatLayout) -> SaveSeatMapRequest {
    SaveSeatMapRequest {
        bus_id: bus_id.into(),
        seats: seat_definitions(layout),
    }
}

// Grid dimensions are bounded by `LayoutLimits`, far below u32::MAX.
fn one_based(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
