use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use seatplan_core::editor::{EditorSession, SessionClick, SessionKind};
use seatplan_core::model::{Coord, Dimensions, ToolMode};
use seatplan_core::submit::{BusBackend, BusForm, SubmitReport, submit};

/// Terminal editor state: one session, a cursor and a status line.
pub struct App<B> {
    pub session: EditorSession,
    pub form: BusForm,
    pub cursor: Coord,
    pub status: String,
    pub saved: Option<SubmitReport>,
    pub should_quit: bool,
    backend: B,
}

impl<B: BusBackend> App<B> {
    pub fn new(session: EditorSession, form: BusForm, backend: B) -> Self {
        let status = if session.is_read_only() {
            "view only · q quit".to_string()
        } else {
            "←↑↓→ move · space click · p/s/e tool · t toggle · w save · q quit".to_string()
        };
        Self {
            session,
            form,
            cursor: Coord::new(0, 0, 0),
            status,
            saved: None,
            should_quit: false,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.session.editor().is_some() {
            self.handle_editor_key(key.code);
        } else {
            self.handle_grid_key(key.code);
        }
    }

    /// Move the cursor to `coord` and click it, as a mouse press does.
    pub fn click_at(&mut self, coord: Coord) {
        self.cursor = coord;
        self.click();
    }

    fn handle_editor_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => match self.session.apply_editor() {
                Ok(_) => self.status = format!("seat code updated at {}", self.cursor),
                Err(e) => self.status = e.to_string(),
            },
            KeyCode::Esc => {
                self.session.dismiss_editor();
                self.status = "edit discarded".to_string();
            }
            KeyCode::Backspace => {
                if let Some(editor) = self.session.editor_mut() {
                    editor.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(editor) = self.session.editor_mut() {
                    editor.push_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_grid_key(&mut self, code: KeyCode) {
        let dims = self.session.layout().dimensions();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.cursor.col = self.cursor.col.saturating_sub(1),
            KeyCode::Right => {
                self.cursor.col = (self.cursor.col + 1).min(dims.cols.saturating_sub(1));
            }
            KeyCode::Up => self.cursor.row = self.cursor.row.saturating_sub(1),
            KeyCode::Down => {
                self.cursor.row = (self.cursor.row + 1).min(dims.rows.saturating_sub(1));
            }
            KeyCode::Tab => self.cursor.deck = (self.cursor.deck + 1) % dims.decks.max(1),
            KeyCode::Char(' ') | KeyCode::Enter => self.click(),
            KeyCode::Char('p') => self.set_mode(ToolMode::Path),
            KeyCode::Char('s') => self.set_mode(ToolMode::Seat),
            KeyCode::Char('e') => self.set_mode(ToolMode::Edit),
            KeyCode::Char('t') => self.toggle_kind(),
            KeyCode::Char('w') => self.save(),
            KeyCode::Char('d') => {
                let decks = if dims.decks == 1 { 2 } else { 1 };
                self.resize(Dimensions { decks, ..dims });
            }
            KeyCode::Char('r') => self.resize(Dimensions {
                rows: dims.rows + 1,
                ..dims
            }),
            KeyCode::Char('R') => self.resize(Dimensions {
                rows: dims.rows.saturating_sub(1),
                ..dims
            }),
            KeyCode::Char('c') => self.resize(Dimensions {
                cols: dims.cols + 1,
                ..dims
            }),
            KeyCode::Char('C') => self.resize(Dimensions {
                cols: dims.cols.saturating_sub(1),
                ..dims
            }),
            _ => {}
        }
    }

    fn set_mode(&mut self, mode: ToolMode) {
        self.session.set_mode(mode);
        self.status = format!("tool: {}", mode.label());
    }

    fn click(&mut self) {
        match self.session.click(self.cursor) {
            Ok(SessionClick::EditorOpened(at)) => {
                self.status = format!("editing {at} · enter apply · esc cancel");
            }
            Ok(SessionClick::Painted { .. }) | Ok(SessionClick::Ignored) => {
                self.status = self.session.cell_hint(self.cursor);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn toggle_kind(&mut self) {
        let cursor = self.cursor;
        let is_seat = self
            .session
            .layout()
            .get(cursor)
            .is_some_and(|cell| cell.is_seat);
        let result = self
            .session
            .store_mut()
            .and_then(|store| store.set_kind(cursor, !is_seat).map_err(Into::into));
        if let Err(e) = result {
            self.status = e.to_string();
        }
    }

    fn resize(&mut self, dimensions: Dimensions) {
        match self.session.resize(dimensions) {
            Ok(()) => {
                self.cursor = Coord::new(
                    self.cursor.deck.min(dimensions.decks.saturating_sub(1)),
                    self.cursor.row.min(dimensions.rows.saturating_sub(1)),
                    self.cursor.col.min(dimensions.cols.saturating_sub(1)),
                );
                self.status = format!("layout {dimensions}");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn save(&mut self) {
        match submit(&mut self.backend, &self.form, &self.session) {
            Ok(report) => {
                self.status = format!(
                    "saved bus {} ({} seats)",
                    report.bus_id, report.seats_saved
                );
                self.saved = Some(report);
                self.should_quit = true;
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    pub fn title(&self) -> String {
        let what = match self.session.kind() {
            SessionKind::NewBus => "Add New Bus".to_string(),
            SessionKind::ExistingBus { bus_id } => format!("Edit Bus {bus_id}"),
            SessionKind::ViewOnly { bus_id } => format!("View Bus {bus_id}"),
        };
        let active = self.session.mode();
        let tools: Vec<String> = ToolMode::ALL
            .iter()
            .map(|&mode| {
                if mode == active {
                    format!("[{}]", mode.label())
                } else {
                    mode.label().to_string()
                }
            })
            .collect();
        format!(
            " seatplan · {what} · {} · {} · capacity {} ",
            self.session.layout().dimensions(),
            tools.join(" "),
            self.session.total_seats(),
        )
    }
}
