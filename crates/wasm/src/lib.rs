use std::sync::{Mutex, MutexGuard};

use seatplan_core::config::EditorConfig;
use seatplan_core::editor::{CellEditor, EditorSession, SessionClick};
use seatplan_core::flatten::seat_definitions;
use seatplan_core::model::{Coord, Dimensions, ToolMode};
use seatplan_core::parsers::{HydrationPolicy, parse_bus_detail};
use seatplan_core::views::{self, GridMetrics, Highlight};
use seatplan_protocol::{CellRef, Point, Viewport};
use wasm_bindgen::prelude::*;

static SESSIONS: Mutex<Vec<Option<EditorSession>>> = Mutex::new(Vec::new());

type BridgeResult<T> = Result<T, String>;

fn sessions() -> BridgeResult<MutexGuard<'static, Vec<Option<EditorSession>>>> {
    SESSIONS
        .lock()
        .map_err(|_| "session registry is poisoned".to_string())
}

fn register(session: EditorSession) -> BridgeResult<usize> {
    let mut sessions = sessions()?;
    let idx = sessions.len();
    sessions.push(Some(session));
    Ok(idx)
}

fn with_session<T>(
    handle: usize,
    f: impl FnOnce(&mut EditorSession) -> BridgeResult<T>,
) -> BridgeResult<T> {
    let mut sessions = sessions()?;
    let session = sessions
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or_else(|| format!("invalid session handle: {handle}"))?;
    f(session)
}

fn to_json(value: &impl serde::Serialize) -> BridgeResult<String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn js<T>(result: BridgeResult<T>) -> Result<T, JsError> {
    result.map_err(|e| JsError::new(&e))
}

fn new_layout_impl(decks: usize, rows: usize, cols: usize) -> BridgeResult<usize> {
    let session = EditorSession::new_bus_with(
        &EditorConfig::default(),
        Dimensions::new(decks, rows, cols),
    )
    .map_err(|e| e.to_string())?;
    register(session)
}

fn open_bus_impl(json: &str, view_only: bool, lenient: bool) -> BridgeResult<usize> {
    let detail = parse_bus_detail(json.as_bytes()).map_err(|e| e.to_string())?;
    let mut config = EditorConfig::default();
    if lenient {
        config.hydration_policy = HydrationPolicy::Lenient;
    }
    let session = if view_only {
        EditorSession::view_only(&detail, &config)
    } else {
        EditorSession::existing_bus(&detail, &config)
    }
    .map_err(|e| e.to_string())?;
    register(session)
}

fn click_impl(handle: usize, coord: Coord) -> BridgeResult<String> {
    with_session(handle, |session| {
        let outcome = session.click(coord).map_err(|e| e.to_string())?;
        Ok(match outcome {
            SessionClick::Ignored => "ignored",
            SessionClick::Painted { changed: true, .. } => "painted",
            SessionClick::Painted { changed: false, .. } => "unchanged",
            SessionClick::EditorOpened(_) => "editor",
        }
        .to_string())
    })
}

fn viewport(x: f64, y: f64, width: f64, height: f64, dpr: f64) -> Viewport {
    Viewport {
        x,
        y,
        width,
        height,
        dpr,
    }
}

/// Start a new bus with a generated layout. Returns a session handle.
#[wasm_bindgen]
pub fn new_layout(decks: usize, rows: usize, cols: usize) -> Result<usize, JsError> {
    js(new_layout_impl(decks, rows, cols))
}

/// Open a bus detail document (JSON). Returns a session handle.
#[wasm_bindgen]
pub fn open_bus(json: &str, view_only: bool, lenient: bool) -> Result<usize, JsError> {
    js(open_bus_impl(json, view_only, lenient))
}

/// Select the tool: `SEAT`, `PATH` or `EDIT`.
#[wasm_bindgen]
pub fn set_tool(handle: usize, tool: &str) -> Result<(), JsError> {
    js(with_session(handle, |session| {
        session.set_mode(tool.parse::<ToolMode>()?);
        Ok(())
    }))
}

/// Click a cell. Returns `ignored`, `painted`, `unchanged` or `editor`.
#[wasm_bindgen]
pub fn click_cell(handle: usize, deck: usize, row: usize, col: usize) -> Result<String, JsError> {
    js(click_impl(handle, Coord::new(deck, row, col)))
}

#[wasm_bindgen]
pub fn editor_set_draft(handle: usize, draft: &str) -> Result<(), JsError> {
    js(with_session(handle, |session| {
        let editor = session
            .editor_mut()
            .ok_or_else(|| "no cell editor is open".to_string())?;
        editor.set_draft(draft);
        Ok(())
    }))
}

/// Commit the open editor. Returns whether the code changed.
#[wasm_bindgen]
pub fn editor_apply(handle: usize) -> Result<bool, JsError> {
    js(with_session(handle, |session| {
        session.apply_editor().map_err(|e| e.to_string())
    }))
}

#[wasm_bindgen]
pub fn editor_dismiss(handle: usize) -> Result<(), JsError> {
    js(with_session(handle, |session| {
        session.dismiss_editor();
        Ok(())
    }))
}

/// The flattened seat list as JSON.
#[wasm_bindgen]
pub fn get_seat_definitions(handle: usize) -> Result<String, JsError> {
    js(with_session(handle, |session| {
        to_json(&seat_definitions(session.layout()))
    }))
}

#[wasm_bindgen]
pub fn total_seats(handle: usize) -> Result<usize, JsError> {
    js(with_session(handle, |session| Ok(session.total_seats())))
}

#[wasm_bindgen]
pub fn cell_hint(handle: usize, deck: usize, row: usize, col: usize) -> Result<String, JsError> {
    js(with_session(handle, |session| {
        Ok(session.cell_hint(Coord::new(deck, row, col)))
    }))
}

/// Render one deck scaled into the viewport, returning render commands as
/// JSON.
#[wasm_bindgen]
pub fn render_deck(
    handle: usize,
    deck: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    dpr: f64,
) -> Result<String, JsError> {
    js(with_session(handle, |session| {
        let viewport = viewport(x, y, width, height, dpr);
        let metrics = GridMetrics::fit(&viewport, session.layout().dimensions());
        let highlight = Highlight {
            cursor: None,
            editing: session.editor().map(CellEditor::coord),
        };
        let commands =
            views::render_deck(session.layout(), deck, &viewport, &metrics, &highlight);
        to_json(&commands)
    }))
}

/// The cell under a pointer as `{deck,row,col}` JSON, or `null`.
#[wasm_bindgen]
pub fn cell_at(
    handle: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    px: f64,
    py: f64,
) -> Result<String, JsError> {
    js(with_session(handle, |session| {
        let viewport = viewport(x, y, width, height, 1.0);
        let dims = session.layout().dimensions();
        let metrics = GridMetrics::fit(&viewport, dims);
        let hit = views::hit_test(dims, &viewport, &metrics, Point::new(px, py));
        to_json(&hit.map(CellRef::from))
    }))
}

/// Drop a session. Its handle is not reused.
#[wasm_bindgen]
pub fn close_session(handle: usize) -> Result<(), JsError> {
    js(sessions().and_then(|mut sessions| {
        sessions
            .get_mut(handle)
            .and_then(Option::take)
            .map(drop)
            .ok_or_else(|| format!("invalid session handle: {handle}"))
    }))
}
