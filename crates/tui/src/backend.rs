use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use seatplan_core::submit::{BackendError, BusBackend};
use seatplan_protocol::{BusDetail, BusPayload, CreatedBus, SaveSeatMapRequest, SeatRecord};
use serde::Serialize;

/// Stores buses as JSON files in a directory, the way the fleet service
/// would hold them.
///
/// `bus-<id>.json` is a bus detail document (id, bus fields and the last
/// saved seats), so `seatplan edit` can reopen it. `seat-map-<id>.json`
/// keeps the last seat-map request as sent.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn bus_path(&self, bus_id: &str) -> PathBuf {
        self.dir.join(format!("bus-{bus_id}.json"))
    }

    pub fn seat_map_path(&self, bus_id: &str) -> PathBuf {
        self.dir.join(format!("seat-map-{bus_id}.json"))
    }

    /// The stored detail for `bus_id`, or `None` when no file exists yet.
    fn read_detail(&self, bus_id: &str) -> Result<Option<BusDetail>, BackendError> {
        let path = self.bus_path(bus_id);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BackendError::with_source(
                    format!("cannot read {}", path.display()),
                    e,
                ));
            }
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| BackendError::with_source(format!("invalid bus {}", path.display()), e))
    }

    fn write_json(&self, path: &Path, value: &impl Serialize) -> Result<(), BackendError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            BackendError::with_source(format!("cannot create {}", self.dir.display()), e)
        })?;
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| BackendError::with_source("cannot encode request", e))?;
        fs::write(path, json)
            .map_err(|e| BackendError::with_source(format!("cannot write {}", path.display()), e))
    }
}

/// Ids end up in file names, so they may not leave the output directory.
fn check_id(bus_id: &str) -> Result<(), BackendError> {
    if bus_id.is_empty() || bus_id.contains(['/', '\\']) || bus_id.contains("..") {
        return Err(BackendError::new(format!("invalid bus id {bus_id:?}")));
    }
    Ok(())
}

fn detail_from(bus_id: &str, payload: &BusPayload, seats: Option<Vec<SeatRecord>>) -> BusDetail {
    BusDetail {
        id: bus_id.to_string(),
        operator_id: Some(payload.operator_id.clone()),
        plate_number: payload.plate_number.clone(),
        model: payload.model.clone(),
        bus_type: payload.bus_type,
        seat_capacity: payload.seat_capacity,
        seats,
    }
}

impl BusBackend for FileBackend {
    fn create_bus(&mut self, payload: &BusPayload) -> Result<CreatedBus, BackendError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.write_json(&self.bus_path(&id), &detail_from(&id, payload, None))?;
        tracing::debug!(bus_id = %id, "bus file created");
        Ok(CreatedBus { id })
    }

    /// Replaces the bus fields. Seats already on file are kept; only the
    /// seat-map call replaces them.
    fn update_bus(&mut self, bus_id: &str, payload: &BusPayload) -> Result<(), BackendError> {
        check_id(bus_id)?;
        let seats = self.read_detail(bus_id)?.and_then(|detail| detail.seats);
        self.write_json(&self.bus_path(bus_id), &detail_from(bus_id, payload, seats))
    }

    fn save_seat_map(&mut self, request: &SaveSeatMapRequest) -> Result<(), BackendError> {
        let bus_id = request.bus_id.as_str();
        check_id(bus_id)?;
        self.write_json(&self.seat_map_path(bus_id), request)?;

        let mut detail = self.read_detail(bus_id)?.unwrap_or_else(|| BusDetail {
            id: bus_id.to_string(),
            ..BusDetail::default()
        });
        detail.seats = Some(request.seats.iter().map(SeatRecord::from).collect());
        self.write_json(&self.bus_path(bus_id), &detail)
    }
}

#[cfg(test)]
mod tests {
    use seatplan_core::config::EditorConfig;
    use seatplan_core::editor::EditorSession;
    use seatplan_core::model::{Cell, Coord, Dimensions, ToolMode};
    use seatplan_core::parsers::parse_bus_detail;
    use seatplan_core::submit::{BusForm, submit};
    use seatplan_protocol::BusType;

    use super::*;

    fn form() -> BusForm {
        BusForm {
            operator_id: Some("op-7".into()),
            plate_number: "51B-777.77".into(),
            model: "Hyundai Universe".into(),
            bus_type: BusType::Limousine,
            seat_capacity: 0,
        }
    }

    #[test]
    fn new_bus_can_be_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        let config = EditorConfig::default();
        let mut session = EditorSession::new_bus_with(&config, Dimensions::new(1, 2, 2)).unwrap();
        session.set_mode(ToolMode::Path);
        session.click(Coord::new(0, 1, 0)).unwrap();
        let report = submit(&mut backend, &form(), &session).unwrap();

        let data = fs::read(backend.bus_path(&report.bus_id)).unwrap();
        let detail = parse_bus_detail(&data).unwrap();
        assert_eq!(detail.id, report.bus_id);
        assert_eq!(detail.operator_id.as_deref(), Some("op-7"));
        assert_eq!(detail.bus_type, BusType::Limousine);
        assert_eq!(detail.seat_capacity, 3);

        let reopened = EditorSession::existing_bus(&detail, &config).unwrap();
        assert_eq!(reopened.layout(), session.layout());
        assert_eq!(reopened.layout().get(Coord::new(0, 1, 0)), Some(&Cell::path()));
        assert!(backend.seat_map_path(&report.bus_id).exists());
    }

    #[test]
    fn update_keeps_seats_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        let request = SaveSeatMapRequest {
            bus_id: "bus-1".into(),
            seats: vec![seatplan_protocol::SeatDefinition {
                seat_code: "A01".into(),
                row: 1,
                col: 1,
                deck: 1,
                is_available: true,
            }],
        };
        backend.save_seat_map(&request).unwrap();

        let payload = BusPayload {
            operator_id: "op-2".into(),
            plate_number: "29A-1".into(),
            model: "Thaco".into(),
            bus_type: BusType::Seater,
            seat_capacity: 1,
        };
        backend.update_bus("bus-1", &payload).unwrap();

        let detail = parse_bus_detail(&fs::read(backend.bus_path("bus-1")).unwrap()).unwrap();
        assert_eq!(detail.plate_number, "29A-1");
        assert_eq!(detail.seats.unwrap_or_default().len(), 1);
    }

    #[test]
    fn ids_cannot_escape_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut backend = FileBackend::new(&out);
        let payload = BusPayload {
            operator_id: "op".into(),
            plate_number: String::new(),
            model: String::new(),
            bus_type: BusType::Sleeper,
            seat_capacity: 0,
        };
        for id in ["../x", "a/b", "a\\b", "..", ""] {
            let err = backend.update_bus(id, &payload).unwrap_err();
            assert!(err.to_string().starts_with("invalid bus id"), "{id}: {err}");
            let request = SaveSeatMapRequest {
                bus_id: id.into(),
                seats: Vec::new(),
            };
            assert!(backend.save_seat_map(&request).is_err());
        }
        assert!(!dir.path().join("bus-x.json").exists());
        assert!(!out.exists());
    }
}
