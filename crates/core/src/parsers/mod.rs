pub mod hydrate;

use seatplan_protocol::{BusDetail, SaveSeatMapRequest, SeatRecord};
use thiserror::Error;

use crate::model::SeatLayout;
use hydrate::{HydrateError, HydrateOptions};

pub use hydrate::{HydrationPolicy, NormalizedSeat, hydrate, hydrate_bus, normalize_record};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hydrate: {0}")]
    Hydrate(#[from] HydrateError),
    #[error("unable to detect format")]
    UnknownFormat,
}

/// Decode a bus detail response.
pub fn parse_bus_detail(data: &[u8]) -> Result<BusDetail, ParseError> {
    Ok(serde_json::from_slice(data)?)
}

/// Auto-detect the input shape and hydrate a layout from it.
///
/// Accepted shapes, in detection order:
/// 1. A saved seat-map request: object with `busId` and `seats`.
/// 2. A bus detail: object with `id` (its `seats` may be absent).
/// 3. A bare object with a `seats` array.
/// 4. A top-level array of seat records.
pub fn parse_layout_auto(data: &[u8], options: &HydrateOptions) -> Result<SeatLayout, ParseError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;

    if let Some(obj) = value.as_object() {
        if obj.contains_key("busId") && obj.contains_key("seats") {
            let request: SaveSeatMapRequest = serde_json::from_value(value)?;
            let records: Vec<SeatRecord> = request.seats.iter().map(SeatRecord::from).collect();
            return Ok(hydrate::hydrate(&records, options)?);
        }

        if obj.contains_key("id") {
            let detail: BusDetail = serde_json::from_value(value)?;
            return Ok(hydrate::hydrate_bus(&detail, options)?);
        }

        if let Some(seats) = obj.get("seats")
            && seats.is_array()
        {
            let records: Vec<SeatRecord> = serde_json::from_value(seats.clone())?;
            return Ok(hydrate::hydrate(&records, options)?);
        }
    }

    if value.is_array() {
        let records: Vec<SeatRecord> = serde_json::from_value(value)?;
        return Ok(hydrate::hydrate(&records, options)?);
    }

    Err(ParseError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Coord, Dimensions};

    #[test]
    fn detects_bus_detail() {
        let data = br#"{"id":"b1","plateNumber":"51B-123.45","seats":[{"seatCode":"A01","deckNumber":1,"gridRow":1,"gridCol":1}]}"#;
        let layout = parse_layout_auto(data, &HydrateOptions::default()).unwrap();
        assert_eq!(layout.dimensions(), Dimensions::new(1, 1, 1));
    }

    #[test]
    fn detects_save_request() {
        let data = br#"{"busId":"b1","seats":[{"seatCode":"A05","row":2,"col":2,"deck":1,"isAvailable":true}]}"#;
        let layout = parse_layout_auto(data, &HydrateOptions::default()).unwrap();
        assert_eq!(layout.get(Coord::new(0, 1, 1)), Some(&Cell::seat("A05")));
    }

    #[test]
    fn detects_seats_object() {
        let data = br#"{"name":"export","seats":[
            {"seatCode":"A01","deck":1,"row":1,"col":1},
            {"seatCode":"A06","deck":1,"row":2,"col":3}
        ]}"#;
        let layout = parse_layout_auto(data, &HydrateOptions::default()).unwrap();
        assert_eq!(layout.dimensions(), Dimensions::new(1, 2, 3));
        assert_eq!(layout.get(Coord::new(0, 1, 2)), Some(&Cell::seat("A06")));
        assert!(layout.get(Coord::new(0, 0, 1)).unwrap().is_path());
    }

    #[test]
    fn detects_bare_array() {
        let data = br#"[{"seatCode":"B01","deck":2,"row":1,"col":1}]"#;
        let layout = parse_layout_auto(data, &HydrateOptions::default()).unwrap();
        assert_eq!(layout.dimensions(), Dimensions::new(2, 1, 1));
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(matches!(
            parse_layout_auto(br#"{"name":"x"}"#, &HydrateOptions::default()),
            Err(ParseError::UnknownFormat)
        ));
        assert!(matches!(
            parse_layout_auto(b"not json", &HydrateOptions::default()),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn hydration_errors_surface() {
        let data = br#"[{"seatCode":"A01","row":1,"col":1}]"#;
        assert!(matches!(
            parse_layout_auto(data, &HydrateOptions::default()),
            Err(ParseError::Hydrate(HydrateError::MissingCoordinate { .. }))
        ));
    }
}
