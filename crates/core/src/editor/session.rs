use seatplan_protocol::BusDetail;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::generate::default_layout;
use crate::model::{Coord, Dimensions, LayoutError, LayoutLimits, SeatLayout, ToolMode};
use crate::parsers::hydrate::{HydrateError, hydrate_bus};

use super::cell_editor::CellEditor;
use super::store::{ClickOutcome, LayoutStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("layout of an existing bus cannot be resized")]
    FixedDimensions,
    #[error("session is view-only")]
    ReadOnly,
    #[error("no cell editor is open")]
    NoEditorOpen,
}

/// Which bus the session edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    /// Not yet created on the backend; dimensions are still adjustable.
    NewBus,
    ExistingBus { bus_id: String },
    /// Clicks are ignored and nothing can be submitted.
    ViewOnly { bus_id: String },
}

/// What a session-level click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClick {
    Ignored,
    Painted { coord: Coord, changed: bool },
    EditorOpened(Coord),
}

/// One open seat-map dialog: the layout, the selected tool and at most one
/// open cell editor.
#[derive(Debug)]
pub struct EditorSession {
    kind: SessionKind,
    store: LayoutStore,
    mode: ToolMode,
    editor: Option<CellEditor>,
    limits: LayoutLimits,
}

impl EditorSession {
    /// Start a new bus with the configured default dimensions.
    pub fn new_bus(config: &EditorConfig) -> Self {
        Self::with_layout(
            SessionKind::NewBus,
            default_layout(config.default_dimensions),
            config.limits,
        )
    }

    /// Start a new bus with explicit dimensions.
    pub fn new_bus_with(
        config: &EditorConfig,
        dimensions: Dimensions,
    ) -> Result<Self, LayoutError> {
        config.limits.check(dimensions)?;
        Ok(Self::with_layout(
            SessionKind::NewBus,
            default_layout(dimensions),
            config.limits,
        ))
    }

    /// Open an existing bus for editing.
    pub fn existing_bus(detail: &BusDetail, config: &EditorConfig) -> Result<Self, HydrateError> {
        let layout = hydrate_bus(detail, &config.hydrate_options())?;
        Ok(Self::with_layout(
            SessionKind::ExistingBus {
                bus_id: detail.id.clone(),
            },
            layout,
            config.limits,
        ))
    }

    /// Open an existing bus read-only.
    pub fn view_only(detail: &BusDetail, config: &EditorConfig) -> Result<Self, HydrateError> {
        let layout = hydrate_bus(detail, &config.hydrate_options())?;
        Ok(Self::with_layout(
            SessionKind::ViewOnly {
                bus_id: detail.id.clone(),
            },
            layout,
            config.limits,
        ))
    }

    fn with_layout(kind: SessionKind, layout: SeatLayout, limits: LayoutLimits) -> Self {
        Self {
            kind,
            store: LayoutStore::new(layout),
            mode: ToolMode::default(),
            editor: None,
            limits,
        }
    }

    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    pub fn bus_id(&self) -> Option<&str> {
        match &self.kind {
            SessionKind::NewBus => None,
            SessionKind::ExistingBus { bus_id } | SessionKind::ViewOnly { bus_id } => Some(bus_id),
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, SessionKind::ViewOnly { .. })
    }

    pub fn layout(&self) -> &SeatLayout {
        self.store.layout()
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    /// Direct store access, for observers and kind toggles.
    pub fn store_mut(&mut self) -> Result<&mut LayoutStore, SessionError> {
        if self.is_read_only() {
            return Err(SessionError::ReadOnly);
        }
        Ok(&mut self.store)
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Select a tool. Any open editor is dismissed.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if mode != self.mode {
            self.editor = None;
        }
        self.mode = mode;
    }

    pub fn editor(&self) -> Option<&CellEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut CellEditor> {
        self.editor.as_mut()
    }

    /// Click a cell with the selected tool.
    pub fn click(&mut self, coord: Coord) -> Result<SessionClick, SessionError> {
        if self.is_read_only() {
            return Ok(SessionClick::Ignored);
        }
        match self.store.click(coord, self.mode)? {
            ClickOutcome::Ignored => Ok(SessionClick::Ignored),
            ClickOutcome::Painted { coord, changed } => {
                Ok(SessionClick::Painted { coord, changed })
            }
            ClickOutcome::OpenEditor(editor) => {
                self.editor = Some(editor);
                Ok(SessionClick::EditorOpened(coord))
            }
        }
    }

    /// Commit the open editor's draft and close it. On error the editor
    /// stays open.
    pub fn apply_editor(&mut self) -> Result<bool, SessionError> {
        let editor = self.editor.as_ref().ok_or(SessionError::NoEditorOpen)?;
        let changed = editor.apply(&mut self.store)?;
        self.editor = None;
        Ok(changed)
    }

    /// Close the open editor, discarding its draft.
    pub fn dismiss_editor(&mut self) {
        self.editor = None;
    }

    /// Regenerate a new bus's layout at different dimensions. Edits made so
    /// far are discarded.
    pub fn resize(&mut self, dimensions: Dimensions) -> Result<(), SessionError> {
        match self.kind {
            SessionKind::NewBus => {}
            SessionKind::ExistingBus { .. } => return Err(SessionError::FixedDimensions),
            SessionKind::ViewOnly { .. } => return Err(SessionError::ReadOnly),
        }
        self.limits.check(dimensions)?;
        self.editor = None;
        self.store.replace(default_layout(dimensions));
        Ok(())
    }

    pub fn total_seats(&self) -> usize {
        self.store.layout().seat_count()
    }

    /// Tooltip text for a cell under the current tool.
    pub fn cell_hint(&self, coord: Coord) -> String {
        let Some(cell) = self.layout().get(coord) else {
            return String::new();
        };
        if self.is_read_only() {
            return format!("Seat: {}", cell.code);
        }
        match self.mode {
            ToolMode::Edit if cell.is_seat => "Click to edit code".to_string(),
            ToolMode::Edit => String::new(),
            mode => format!("Click to set {mode}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use seatplan_protocol::SeatRecord;

    use super::*;
    use crate::model::Cell;

    fn detail_with(records: Vec<SeatRecord>) -> BusDetail {
        BusDetail {
            id: "bus-42".into(),
            seats: Some(records),
            ..BusDetail::default()
        }
    }

    fn seat(code: &str, deck: i64, row: i64, col: i64) -> SeatRecord {
        SeatRecord {
            seat_code: Some(code.into()),
            deck: Some(deck),
            row: Some(row),
            col: Some(col),
            ..SeatRecord::default()
        }
    }

    #[test]
    fn new_bus_starts_from_default_layout() {
        let session = EditorSession::new_bus(&EditorConfig::default());
        assert_eq!(session.kind(), &SessionKind::NewBus);
        assert_eq!(session.layout().dimensions(), Dimensions::new(1, 6, 3));
        assert_eq!(session.total_seats(), 18);
        assert_eq!(session.mode(), ToolMode::Seat);
        assert!(session.bus_id().is_none());
    }

    #[test]
    fn resize_regenerates_and_validates() {
        let mut session = EditorSession::new_bus(&EditorConfig::default());
        session.set_mode(ToolMode::Path);
        session.click(Coord::new(0, 0, 0)).unwrap();
        session.resize(Dimensions::new(2, 4, 4)).unwrap();
        assert_eq!(session.total_seats(), 32);
        assert_eq!(
            session.resize(Dimensions::new(1, 13, 4)),
            Err(SessionError::Layout(LayoutError::DimensionsOutOfRange {
                dimensions: Dimensions::new(1, 13, 4),
                limits: LayoutLimits::default(),
            }))
        );
        assert_eq!(session.layout().dimensions(), Dimensions::new(2, 4, 4));
    }

    #[test]
    fn existing_bus_cannot_resize() {
        let detail = detail_with(vec![seat("A01", 1, 1, 1)]);
        let mut session = EditorSession::existing_bus(&detail, &EditorConfig::default()).unwrap();
        assert_eq!(session.bus_id(), Some("bus-42"));
        assert_eq!(
            session.resize(Dimensions::new(1, 6, 3)),
            Err(SessionError::FixedDimensions)
        );
    }

    #[test]
    fn edit_flow_applies_code() {
        let detail = detail_with(vec![seat("A01", 1, 1, 1), seat("A02", 1, 1, 2)]);
        let mut session = EditorSession::existing_bus(&detail, &EditorConfig::default()).unwrap();
        session.set_mode(ToolMode::Edit);
        let at = Coord::new(0, 0, 1);
        assert_eq!(session.click(at).unwrap(), SessionClick::EditorOpened(at));
        session.editor_mut().unwrap().set_draft("W2");
        assert!(session.apply_editor().unwrap());
        assert!(session.editor().is_none());
        assert_eq!(session.layout().get(at), Some(&Cell::seat("W2")));
    }

    #[test]
    fn failed_apply_keeps_editor_open() {
        let mut session = EditorSession::new_bus(&EditorConfig::default());
        session.set_mode(ToolMode::Edit);
        session.click(Coord::new(0, 0, 0)).unwrap();
        session.editor_mut().unwrap().set_draft(" ");
        assert!(matches!(
            session.apply_editor(),
            Err(SessionError::Layout(LayoutError::EmptyCode(_)))
        ));
        assert!(session.editor().is_some());
        session.dismiss_editor();
        assert_eq!(session.apply_editor(), Err(SessionError::NoEditorOpen));
    }

    #[test]
    fn switching_tool_closes_editor() {
        let mut session = EditorSession::new_bus(&EditorConfig::default());
        session.set_mode(ToolMode::Edit);
        session.click(Coord::new(0, 0, 0)).unwrap();
        assert!(session.editor().is_some());
        session.set_mode(ToolMode::Seat);
        assert!(session.editor().is_none());
    }

    #[test]
    fn view_only_ignores_clicks() {
        let detail = detail_with(vec![seat("A01", 1, 1, 1)]);
        let mut session = EditorSession::view_only(&detail, &EditorConfig::default()).unwrap();
        session.set_mode(ToolMode::Path);
        let at = Coord::new(0, 0, 0);
        assert_eq!(session.click(at).unwrap(), SessionClick::Ignored);
        assert_eq!(session.layout().get(at), Some(&Cell::seat("A01")));
        assert!(session.store_mut().is_err());
        assert_eq!(session.cell_hint(at), "Seat: A01");
    }

    #[test]
    fn hints_follow_tool() {
        let mut session = EditorSession::new_bus(&EditorConfig::default());
        let seat_at = Coord::new(0, 0, 0);
        let path_at = Coord::new(0, 0, 1);
        session.set_mode(ToolMode::Path);
        session.click(path_at).unwrap();
        assert_eq!(session.cell_hint(seat_at), "Click to set PATH");
        session.set_mode(ToolMode::Edit);
        assert_eq!(session.cell_hint(seat_at), "Click to edit code");
        assert_eq!(session.cell_hint(path_at), "");
    }
}
