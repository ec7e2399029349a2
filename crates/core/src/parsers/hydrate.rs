//! Rebuilding a grid from persisted seat records.
//!
//! Every raw [`SeatRecord`] passes through [`normalize_record`], the one
//! place that reconciles the two coordinate naming conventions and decides
//! what to do with malformed data. Under [`HydrationPolicy::Strict`]
//! anything ambiguous is an error; [`HydrationPolicy::Lenient`] reproduces
//! the legacy behavior of defaulting missing coordinates to 1.

use std::collections::HashMap;
use std::fmt;

use seatplan_protocol::{BusDetail, SeatRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generate::empty_layout;
use crate::model::{Cell, Coord, Dimensions, LayoutLimits, SeatLayout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationPolicy {
    /// Reject records with missing, conflicting or duplicate data.
    #[default]
    Strict,
    /// Default missing coordinates to 1, prefer `deckNumber`/`gridRow`/
    /// `gridCol` on conflict, skip seats without a code and let later
    /// records overwrite earlier ones. Each fallback is logged.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrateOptions {
    pub policy: HydrationPolicy,
    pub limits: LayoutLimits,
    /// Layout for a bus with no seat records.
    pub fallback: Dimensions,
}

impl Default for HydrateOptions {
    fn default() -> Self {
        Self {
            policy: HydrationPolicy::Strict,
            limits: LayoutLimits::default(),
            fallback: Dimensions::new(1, 6, 3),
        }
    }
}

impl HydrateOptions {
    pub fn lenient() -> Self {
        Self {
            policy: HydrationPolicy::Lenient,
            ..Self::default()
        }
    }

    fn is_lenient(&self) -> bool {
        self.policy == HydrationPolicy::Lenient
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Deck,
    Row,
    Col,
}

impl Axis {
    /// Wire names: the `grid*`/`deckNumber` spelling first, then the short one.
    pub fn field_names(self) -> (&'static str, &'static str) {
        match self {
            Axis::Deck => ("deckNumber", "deck"),
            Axis::Row => ("gridRow", "row"),
            Axis::Col => ("gridCol", "col"),
        }
    }

    fn read(self, record: &SeatRecord) -> (Option<i64>, Option<i64>) {
        match self {
            Axis::Deck => (record.deck_number, record.deck),
            Axis::Row => (record.grid_row, record.row),
            Axis::Col => (record.grid_col, record.col),
        }
    }

    fn max(self, limits: &LayoutLimits) -> usize {
        match self {
            Axis::Deck => limits.max_decks,
            Axis::Row => limits.max_rows,
            Axis::Col => limits.max_cols,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Deck => "deck",
            Axis::Row => "row",
            Axis::Col => "col",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrateError {
    #[error("seat record {index}: missing {axis} coordinate")]
    MissingCoordinate { index: usize, axis: Axis },
    #[error("seat record {index}: {axis} given twice with different values ({primary} vs {alias})")]
    Conflicting {
        index: usize,
        axis: Axis,
        primary: i64,
        alias: i64,
    },
    #[error("seat record {index}: {axis} must be at least 1, got {value}")]
    InvalidCoordinate { index: usize, axis: Axis, value: i64 },
    #[error("seat record {index}: {axis} {value} exceeds the maximum of {max}")]
    OutOfRange {
        index: usize,
        axis: Axis,
        value: i64,
        max: usize,
    },
    #[error("seat record {index}: missing seat code")]
    MissingCode { index: usize },
    #[error("seat record {index}: position {coord} already taken by record {first}")]
    DuplicatePosition {
        index: usize,
        first: usize,
        coord: Coord,
    },
}

/// A seat record after validation: 0-indexed coordinate and a non-blank code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSeat {
    pub coord: Coord,
    pub code: String,
}

/// Validate one raw record. `Ok(None)` means the record was skipped
/// (lenient policy only).
pub fn normalize_record(
    index: usize,
    record: &SeatRecord,
    options: &HydrateOptions,
) -> Result<Option<NormalizedSeat>, HydrateError> {
    let code = record
        .seat_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let Some(code) = code else {
        if options.is_lenient() {
            tracing::warn!(index, "skipping seat record without a seat code");
            return Ok(None);
        }
        return Err(HydrateError::MissingCode { index });
    };

    let deck = normalize_axis(index, Axis::Deck, record, options)?;
    let row = normalize_axis(index, Axis::Row, record, options)?;
    let col = normalize_axis(index, Axis::Col, record, options)?;

    Ok(Some(NormalizedSeat {
        coord: Coord::new(deck, row, col),
        code: code.to_string(),
    }))
}

fn normalize_axis(
    index: usize,
    axis: Axis,
    record: &SeatRecord,
    options: &HydrateOptions,
) -> Result<usize, HydrateError> {
    let lenient = options.is_lenient();
    let (mut primary, mut alias) = axis.read(record);
    if lenient {
        // Legacy data used 0 to mean "unset".
        primary = primary.filter(|&v| v != 0);
        alias = alias.filter(|&v| v != 0);
    }

    let value = match (primary, alias) {
        (Some(p), Some(a)) if p != a => {
            if !lenient {
                return Err(HydrateError::Conflicting {
                    index,
                    axis,
                    primary: p,
                    alias: a,
                });
            }
            let (name, _) = axis.field_names();
            tracing::warn!(
                index,
                %axis,
                primary = p,
                alias = a,
                "conflicting coordinates, using {name}"
            );
            Some(p)
        }
        (Some(p), _) => Some(p),
        (None, a) => a,
    };

    let value = match value {
        Some(v) => v,
        None if lenient => {
            tracing::warn!(index, %axis, "seat record missing coordinate, defaulting to 1");
            1
        }
        None => return Err(HydrateError::MissingCoordinate { index, axis }),
    };

    let max = axis.max(&options.limits);
    let position = usize::try_from(value)
        .ok()
        .filter(|&v| v >= 1)
        .ok_or(HydrateError::InvalidCoordinate { index, axis, value })?;
    if position > max {
        return Err(HydrateError::OutOfRange {
            index,
            axis,
            value,
            max,
        });
    }
    Ok(position - 1)
}

/// Rebuild a grid from seat records.
///
/// The grid is the tight bounding box of the records' coordinates; cells
/// without a record are paths. No usable records yields an empty layout of
/// `options.fallback` dimensions.
pub fn hydrate(
    records: &[SeatRecord],
    options: &HydrateOptions,
) -> Result<SeatLayout, HydrateError> {
    let mut seats = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if let Some(seat) = normalize_record(index, record, options)? {
            seats.push((index, seat));
        }
    }

    if seats.is_empty() {
        tracing::debug!(
            fallback = %options.fallback,
            "no seat records, using empty fallback layout"
        );
        return Ok(empty_layout(options.fallback));
    }

    let dimensions = seats.iter().fold(Dimensions::new(0, 0, 0), |acc, (_, s)| {
        Dimensions::new(
            acc.decks.max(s.coord.deck + 1),
            acc.rows.max(s.coord.row + 1),
            acc.cols.max(s.coord.col + 1),
        )
    });

    let mut layout = empty_layout(dimensions);
    let mut placed: HashMap<Coord, usize> = HashMap::with_capacity(seats.len());
    for (index, seat) in seats {
        if let Some(first) = placed.insert(seat.coord, index) {
            if !options.is_lenient() {
                return Err(HydrateError::DuplicatePosition {
                    index,
                    first,
                    coord: seat.coord,
                });
            }
            tracing::warn!(
                index,
                first,
                coord = %seat.coord,
                "duplicate seat position, later record wins"
            );
        }
        if let Some(cell) = layout.get_mut(seat.coord) {
            *cell = Cell::seat(seat.code);
        }
    }

    tracing::debug!(%dimensions, seats = layout.seat_count(), "hydrated layout");
    Ok(layout)
}

/// Hydrate the layout of an existing bus.
pub fn hydrate_bus(
    detail: &BusDetail,
    options: &HydrateOptions,
) -> Result<SeatLayout, HydrateError> {
    hydrate(detail.seats.as_deref().unwrap_or_default(), options)
}
