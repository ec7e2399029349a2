//! Saving an edited bus: bus metadata first, then its seat map.

use seatplan_protocol::{BusPayload, BusType, CreatedBus, SaveSeatMapRequest};
use thiserror::Error;

use crate::editor::{EditorSession, SessionKind};
use crate::flatten::{seat_definitions, total_seats};

/// Failure reported by a [`BusBackend`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The fleet service the editor saves into.
pub trait BusBackend {
    fn create_bus(&mut self, payload: &BusPayload) -> Result<CreatedBus, BackendError>;
    fn update_bus(&mut self, bus_id: &str, payload: &BusPayload) -> Result<(), BackendError>;
    fn save_seat_map(&mut self, request: &SaveSeatMapRequest) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateBus,
    UpdateBus,
    SaveSeatMap,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::CreateBus => "create bus",
            Stage::UpdateBus => "update bus",
            Stage::SaveSeatMap => "save seat map",
        })
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("please select an operator")]
    MissingOperator,
    #[error("a view-only session cannot be submitted")]
    ReadOnly,
    #[error("{stage} failed: {source}")]
    Backend {
        stage: Stage,
        #[source]
        source: BackendError,
    },
}

/// Bus metadata entered alongside the layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusForm {
    pub operator_id: Option<String>,
    pub plate_number: String,
    pub model: String,
    pub bus_type: BusType,
    /// Shown for existing buses; recomputed from the layout for new ones.
    pub seat_capacity: u32,
}

impl BusForm {
    pub fn from_detail(detail: &seatplan_protocol::BusDetail) -> Self {
        Self {
            operator_id: detail.operator_id.clone(),
            plate_number: detail.plate_number.clone(),
            model: detail.model.clone(),
            bus_type: detail.bus_type,
            seat_capacity: detail.seat_capacity,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub bus_id: String,
    pub created: bool,
    /// Number of seat definitions sent; 0 means the seat-map call was skipped.
    pub seats_saved: usize,
}

/// Run the save sequence for `session`.
///
/// A new bus is created first and its id is used for the seat map; an
/// existing bus is updated in place. The seat-map call is skipped when the
/// layout has no seats. Any failure aborts the remaining steps; the
/// session's layout is left as it was.
pub fn submit(
    backend: &mut impl BusBackend,
    form: &BusForm,
    session: &EditorSession,
) -> Result<SubmitReport, SubmitError> {
    let Some(operator_id) = form.operator_id.as_deref().filter(|id| !id.is_empty()) else {
        return Err(SubmitError::MissingOperator);
    };

    let layout = session.layout();
    let duplicates = layout.duplicate_codes();
    if !duplicates.is_empty() {
        let codes: Vec<&str> = duplicates.keys().map(String::as_str).collect();
        tracing::warn!(?codes, "submitting layout with duplicate seat codes");
    }

    let mut payload = BusPayload {
        operator_id: operator_id.to_string(),
        plate_number: form.plate_number.clone(),
        model: form.model.clone(),
        bus_type: form.bus_type,
        seat_capacity: form.seat_capacity,
    };

    let (bus_id, created) = match session.kind() {
        SessionKind::ViewOnly { .. } => return Err(SubmitError::ReadOnly),
        SessionKind::NewBus => {
            payload.seat_capacity = u32::try_from(total_seats(layout)).unwrap_or(u32::MAX);
            let bus = backend
                .create_bus(&payload)
                .map_err(|source| fail(Stage::CreateBus, source))?;
            tracing::info!(bus_id = %bus.id, capacity = payload.seat_capacity, "created bus");
            (bus.id, true)
        }
        SessionKind::ExistingBus { bus_id } => {
            backend
                .update_bus(bus_id, &payload)
                .map_err(|source| fail(Stage::UpdateBus, source))?;
            tracing::info!(%bus_id, "updated bus");
            (bus_id.clone(), false)
        }
    };

    let seats = seat_definitions(layout);
    let seats_saved = seats.len();
    if seats.is_empty() {
        tracing::debug!(%bus_id, "layout has no seats, skipping seat map");
    } else {
        let request = SaveSeatMapRequest {
            bus_id: bus_id.clone(),
            seats,
        };
        backend
            .save_seat_map(&request)
            .map_err(|source| fail(Stage::SaveSeatMap, source))?;
        tracing::info!(%bus_id, seats = seats_saved, "saved seat map");
    }

    Ok(SubmitReport {
        bus_id,
        created,
        seats_saved,
    })
}

fn fail(stage: Stage, source: BackendError) -> SubmitError {
    tracing::error!(%stage, error = %source, "failed to save bus");
    SubmitError::Backend { stage, source }
}

#[cfg(test)]
mod tests {
    use seatplan_protocol::{BusDetail, SeatRecord};

    use super::*;
    use crate::config::EditorConfig;
    use crate::model::{Coord, Dimensions, ToolMode};

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
        created: Vec<BusPayload>,
        seat_maps: Vec<SaveSeatMapRequest>,
        fail_on: Option<Stage>,
    }

    impl Recorder {
        fn check(&self, stage: Stage) -> Result<(), BackendError> {
            if self.fail_on == Some(stage) {
                Err(BackendError::new("HTTP 500"))
            } else {
                Ok(())
            }
        }
    }

    impl BusBackend for Recorder {
        fn create_bus(&mut self, payload: &BusPayload) -> Result<CreatedBus, BackendError> {
            self.calls.push("create".into());
            self.check(Stage::CreateBus)?;
            self.created.push(payload.clone());
            Ok(CreatedBus {
                id: "new-1".into(),
            })
        }

        fn update_bus(&mut self, bus_id: &str, _payload: &BusPayload) -> Result<(), BackendError> {
            self.calls.push(format!("update {bus_id}"));
            self.check(Stage::UpdateBus)
        }

        fn save_seat_map(&mut self, request: &SaveSeatMapRequest) -> Result<(), BackendError> {
            self.calls.push(format!("seats {}", request.bus_id));
            self.check(Stage::SaveSeatMap)?;
            self.seat_maps.push(request.clone());
            Ok(())
        }
    }

    fn form() -> BusForm {
        BusForm {
            operator_id: Some("op-1".into()),
            plate_number: "29B-000.01".into(),
            model: "Thaco".into(),
            bus_type: BusType::Seater,
            seat_capacity: 40,
        }
    }

    #[test]
    fn missing_operator_makes_no_calls() {
        let mut backend = Recorder::default();
        let session = EditorSession::new_bus(&EditorConfig::default());
        let form = BusForm {
            operator_id: None,
            ..form()
        };
        assert!(matches!(
            submit(&mut backend, &form, &session),
            Err(SubmitError::MissingOperator)
        ));
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn new_bus_creates_then_saves_against_new_id() {
        let mut backend = Recorder::default();
        let config = EditorConfig::default();
        let mut session = EditorSession::new_bus_with(&config, Dimensions::new(1, 2, 3)).unwrap();
        session.set_mode(ToolMode::Path);
        session.click(Coord::new(0, 0, 1)).unwrap();

        let report = submit(&mut backend, &form(), &session).unwrap();
        assert_eq!(backend.calls, ["create", "seats new-1"]);
        // Capacity comes from the layout, not from the form.
        assert_eq!(backend.created[0].seat_capacity, 5);
        assert_eq!(backend.seat_maps[0].seats.len(), 5);
        assert_eq!(
            report,
            SubmitReport {
                bus_id: "new-1".into(),
                created: true,
                seats_saved: 5
            }
        );
    }

    fn bus_nine() -> BusDetail {
        BusDetail {
            id: "bus-9".into(),
            seats: Some(vec![SeatRecord {
                seat_code: Some("A01".into()),
                deck: Some(1),
                row: Some(1),
                col: Some(1),
                ..SeatRecord::default()
            }]),
            ..BusDetail::default()
        }
    }

    #[test]
    fn existing_bus_updates_then_saves() {
        let mut backend = Recorder::default();
        let session = EditorSession::existing_bus(&bus_nine(), &EditorConfig::default()).unwrap();
        let report = submit(&mut backend, &form(), &session).unwrap();
        assert_eq!(backend.calls, ["update bus-9", "seats bus-9"]);
        assert!(!report.created);
    }

    #[test]
    fn update_failure_never_sends_seat_map() {
        let mut backend = Recorder {
            fail_on: Some(Stage::UpdateBus),
            ..Recorder::default()
        };
        let session = EditorSession::existing_bus(&bus_nine(), &EditorConfig::default()).unwrap();
        let err = submit(&mut backend, &form(), &session).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Backend {
                stage: Stage::UpdateBus,
                ..
            }
        ));
        assert_eq!(backend.calls, ["update bus-9"]);
        assert!(backend.seat_maps.is_empty());
    }

    #[test]
    fn empty_layout_skips_seat_map() {
        let mut backend = Recorder::default();
        let detail = BusDetail {
            id: "bus-3".into(),
            ..BusDetail::default()
        };
        let session = EditorSession::existing_bus(&detail, &EditorConfig::default()).unwrap();
        let report = submit(&mut backend, &form(), &session).unwrap();
        assert_eq!(backend.calls, ["update bus-3"]);
        assert_eq!(report.seats_saved, 0);
    }

    #[test]
    fn create_failure_aborts_sequence() {
        let mut backend = Recorder {
            fail_on: Some(Stage::CreateBus),
            ..Recorder::default()
        };
        let session = EditorSession::new_bus(&EditorConfig::default());
        let before = session.layout().clone();
        let err = submit(&mut backend, &form(), &session).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Backend {
                stage: Stage::CreateBus,
                ..
            }
        ));
        assert_eq!(backend.calls, ["create"]);
        assert_eq!(session.layout(), &before);
    }

    #[test]
    fn seat_map_failure_is_reported() {
        let mut backend = Recorder {
            fail_on: Some(Stage::SaveSeatMap),
            ..Recorder::default()
        };
        let session = EditorSession::new_bus(&EditorConfig::default());
        let err = submit(&mut backend, &form(), &session).unwrap_err();
        assert_eq!(err.to_string(), "save seat map failed: HTTP 500");
    }

    #[test]
    fn view_only_is_refused() {
        let mut backend = Recorder::default();
        let detail = BusDetail {
            id: "bus-1".into(),
            ..BusDetail::default()
        };
        let session = EditorSession::view_only(&detail, &EditorConfig::default()).unwrap();
        assert!(matches!(
            submit(&mut backend, &form(), &session),
            Err(SubmitError::ReadOnly)
        ));
        assert!(backend.calls.is_empty());
    }
}
