//! Interactive editing of a seat layout.
//!
//! [`LayoutStore`] is the single writer for the grid. [`CellEditor`] stages
//! a code edit until it is applied. [`EditorSession`] ties both to a tool
//! mode and to the bus being edited.

pub mod cell_editor;
pub mod session;
pub mod store;

pub use cell_editor::CellEditor;
pub use session::{EditorSession, SessionClick, SessionError, SessionKind};
pub use store::{ClickOutcome, LayoutChange, LayoutStore};
