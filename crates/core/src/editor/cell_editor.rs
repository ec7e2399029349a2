use crate::model::{Coord, LayoutError};

use super::store::LayoutStore;

/// Staged edit of one seat's code.
///
/// Only obtainable from an edit-mode click on a seat, and it can only
/// change the code: reclassifying a cell goes through
/// [`LayoutStore::set_kind`]. Nothing reaches the grid until
/// [`apply`](Self::apply); dropping the editor discards the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    coord: Coord,
    original: String,
    draft: String,
}

impl CellEditor {
    pub(crate) fn open(coord: Coord, code: String) -> Self {
        Self {
            coord,
            draft: code.clone(),
            original: code,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Code the seat had when the editor opened.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn pop_char(&mut self) {
        self.draft.pop();
    }

    /// Commit the draft into `store`.
    ///
    /// On error (blank draft, or the cell stopped being a seat) the editor
    /// is left untouched so the caller can keep it open.
    pub fn apply(&self, store: &mut LayoutStore) -> Result<bool, LayoutError> {
        store.retype(self.coord, &self.draft)
    }
}
