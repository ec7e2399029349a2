//! JSON shapes exchanged with the fleet backend.
//!
//! Field names follow the backend's camelCase convention. Seat
//! coordinates on the wire are 1-indexed.

use serde::{Deserialize, Serialize};

/// One seat as persisted by the backend. Path cells have no definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatDefinition {
    pub seat_code: String,
    pub row: u32,
    pub col: u32,
    pub deck: u32,
    #[serde(default = "available")]
    pub is_available: bool,
}

fn available() -> bool {
    true
}

/// A seat record as it arrives inside a bus detail response.
///
/// The backend has shipped two naming conventions for the coordinates
/// (`deckNumber`/`gridRow`/`gridCol` and `deck`/`row`/`col`), so both are
/// captured verbatim here and reconciled by the hydration layer.
/// Values are signed so malformed zero/negative coordinates survive
/// decoding and can be reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_col: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i64>,
}

impl From<&SeatDefinition> for SeatRecord {
    fn from(def: &SeatDefinition) -> Self {
        Self {
            seat_code: Some(def.seat_code.clone()),
            deck: Some(i64::from(def.deck)),
            row: Some(i64::from(def.row)),
            col: Some(i64::from(def.col)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusType {
    #[default]
    Sleeper,
    Limousine,
    Seater,
    Vip,
}

/// Bus detail as returned by `GET /buses/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDetail {
    pub id: String,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, rename = "type")]
    pub bus_type: BusType,
    #[serde(default)]
    pub seat_capacity: u32,
    /// Absent, `null` and `[]` all mean "no recorded seats".
    #[serde(default)]
    pub seats: Option<Vec<SeatRecord>>,
}

/// Body of the create/update bus calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusPayload {
    pub operator_id: String,
    pub plate_number: String,
    pub model: String,
    #[serde(rename = "type")]
    pub bus_type: BusType,
    pub seat_capacity: u32,
}

/// The part of the create-bus response the editor needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBus {
    pub id: String,
}

/// Body of the seat-map save call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSeatMapRequest {
    pub bus_id: String,
    pub seats: Vec<SeatDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_definition_uses_camel_case() {
        let def = SeatDefinition {
            seat_code: "A05".into(),
            row: 2,
            col: 2,
            deck: 1,
            is_available: true,
        };
        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(
            json,
            r#"{"seatCode":"A05","row":2,"col":2,"deck":1,"isAvailable":true}"#
        );
    }

    #[test]
    fn seat_record_accepts_both_conventions() {
        let grid: SeatRecord =
            serde_json::from_str(r#"{"seatCode":"B02","deckNumber":2,"gridRow":1,"gridCol":2}"#)
                .unwrap();
        assert_eq!(grid.deck_number, Some(2));
        assert_eq!(grid.grid_col, Some(2));
        assert_eq!(grid.deck, None);

        let plain: SeatRecord =
            serde_json::from_str(r#"{"seatCode":"A01","deck":1,"row":1,"col":1,"status":"FREE"}"#)
                .unwrap();
        assert_eq!(plain.row, Some(1));
        assert_eq!(plain.grid_row, None);
    }

    #[test]
    fn bus_detail_tolerates_missing_seats() {
        let detail: BusDetail = serde_json::from_str(
            r#"{"id":"bus-1","type":"VIP","operatorName":"Phuong Trang","seats":null}"#,
        )
        .unwrap();
        assert_eq!(detail.bus_type, BusType::Vip);
        assert!(detail.seats.is_none());
        assert_eq!(detail.seat_capacity, 0);
    }

    #[test]
    fn save_request_shape() {
        let req = SaveSeatMapRequest {
            bus_id: "bus-9".into(),
            seats: vec![],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"busId":"bus-9","seats":[]}"#);
    }
}
