use std::fmt;

use crate::generate::default_seat_code;
use crate::model::{Cell, Coord, Dimensions, LayoutError, SeatLayout, ToolMode};

use super::cell_editor::CellEditor;

/// A mutation observed on the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutChange {
    /// One cell changed value.
    Cell {
        coord: Coord,
        before: Cell,
        after: Cell,
    },
    /// The whole grid was swapped out (new dimensions or a reload).
    Replaced { dimensions: Dimensions },
}

/// What a cell click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The cell was painted. `changed` is false when it already had the
    /// painted value.
    Painted { coord: Coord, changed: bool },
    /// Nothing happened (edit mode on a path cell).
    Ignored,
    /// Edit mode on a seat: a staged code edit, nothing written yet.
    OpenEditor(CellEditor),
}

type Observer = Box<dyn FnMut(&LayoutChange) + Send>;

/// Owns the layout being edited and applies single-cell edits in place.
///
/// Observers registered with [`subscribe`](Self::subscribe) are told about
/// every effective change, so views can refresh without cloning the grid.
pub struct LayoutStore {
    layout: SeatLayout,
    observers: Vec<Observer>,
}

impl LayoutStore {
    pub fn new(layout: SeatLayout) -> Self {
        Self {
            layout,
            observers: Vec::new(),
        }
    }

    pub fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&LayoutChange) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply a click at `coord` under `mode`.
    pub fn click(&mut self, coord: Coord, mode: ToolMode) -> Result<ClickOutcome, LayoutError> {
        let cell = self.layout.cell(coord)?;
        match mode {
            ToolMode::Edit => {
                if cell.is_path() {
                    return Ok(ClickOutcome::Ignored);
                }
                Ok(ClickOutcome::OpenEditor(CellEditor::open(
                    coord,
                    cell.code.clone(),
                )))
            }
            ToolMode::Seat => {
                let changed = self.set_kind(coord, true)?;
                Ok(ClickOutcome::Painted { coord, changed })
            }
            ToolMode::Path => {
                let changed = self.set_kind(coord, false)?;
                Ok(ClickOutcome::Painted { coord, changed })
            }
        }
    }

    /// Reclassify a cell as seat or path.
    ///
    /// Turning a cell into a path clears its code. Turning it into a seat
    /// keeps an existing code and otherwise assigns the default one for
    /// its position.
    pub fn set_kind(&mut self, coord: Coord, is_seat: bool) -> Result<bool, LayoutError> {
        let cell = self.layout.cell(coord)?;
        let next = if !is_seat {
            Cell::path()
        } else if cell.code.is_empty() {
            Cell::seat(default_seat_code(coord, self.layout.dimensions().cols))
        } else {
            Cell::seat(cell.code.clone())
        };
        self.write(coord, next)
    }

    /// Change the code of an existing seat. Surrounding whitespace is dropped.
    pub fn retype(&mut self, coord: Coord, code: &str) -> Result<bool, LayoutError> {
        if self.layout.cell(coord)?.is_path() {
            return Err(LayoutError::NotASeat(coord));
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(LayoutError::EmptyCode(coord));
        }
        self.write(coord, Cell::seat(code))
    }

    /// Swap in a different grid.
    pub fn replace(&mut self, layout: SeatLayout) {
        self.layout = layout;
        let change = LayoutChange::Replaced {
            dimensions: self.layout.dimensions(),
        };
        self.notify(&change);
    }

    fn write(&mut self, coord: Coord, next: Cell) -> Result<bool, LayoutError> {
        let dimensions = self.layout.dimensions();
        let cell = self
            .layout
            .get_mut(coord)
            .ok_or(LayoutError::OutOfBounds { coord, dimensions })?;
        if *cell == next {
            return Ok(false);
        }
        let before = std::mem::replace(cell, next.clone());
        self.notify(&LayoutChange::Cell {
            coord,
            before,
            after: next,
        });
        Ok(true)
    }

    fn notify(&mut self, change: &LayoutChange) {
        for observer in &mut self.observers {
            observer(change);
        }
    }
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layout", &self.layout)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;

    use super::*;
    use crate::generate::{default_layout, empty_layout};

    fn store(dims: Dimensions) -> LayoutStore {
        LayoutStore::new(default_layout(dims))
    }

    #[test]
    fn path_mode_clears_seat() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let at = Coord::new(0, 0, 1);
        let out = s.click(at, ToolMode::Path).unwrap();
        assert_eq!(
            out,
            ClickOutcome::Painted {
                coord: at,
                changed: true
            }
        );
        assert_eq!(s.layout().get(at), Some(&Cell::path()));
    }

    #[test]
    fn seat_mode_assigns_default_code_on_empty_cell() {
        let mut s = LayoutStore::new(empty_layout(Dimensions::new(2, 3, 4)));
        s.click(Coord::new(1, 2, 1), ToolMode::Seat).unwrap();
        assert_eq!(
            s.layout().get(Coord::new(1, 2, 1)),
            Some(&Cell::seat("B10"))
        );
    }

    #[test]
    fn seat_mode_preserves_existing_code() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let at = Coord::new(0, 1, 0);
        s.retype(at, "VIP1").unwrap();
        let out = s.click(at, ToolMode::Seat).unwrap();
        assert_eq!(
            out,
            ClickOutcome::Painted {
                coord: at,
                changed: false
            }
        );
        assert_eq!(s.layout().get(at).unwrap().code, "VIP1");
    }

    #[test]
    fn edit_mode_on_path_is_ignored() {
        let mut s = LayoutStore::new(empty_layout(Dimensions::new(1, 2, 2)));
        let before = s.layout().clone();
        let out = s.click(Coord::new(0, 0, 0), ToolMode::Edit).unwrap();
        assert_eq!(out, ClickOutcome::Ignored);
        assert_eq!(s.layout(), &before);
    }

    #[test]
    fn edit_mode_on_seat_opens_editor_without_writing() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let before = s.layout().clone();
        let out = s.click(Coord::new(0, 1, 1), ToolMode::Edit).unwrap();
        let ClickOutcome::OpenEditor(editor) = out else {
            panic!("expected editor, got {out:?}");
        };
        assert_eq!(editor.coord(), Coord::new(0, 1, 1));
        assert_eq!(editor.draft(), "A04");
        assert_eq!(s.layout(), &before);
    }

    #[test]
    fn out_of_bounds_click_errors() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let err = s.click(Coord::new(0, 5, 0), ToolMode::Path).unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { .. }));
    }

    #[test]
    fn retype_rejects_paths_and_blank_codes() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let at = Coord::new(0, 0, 0);
        assert_eq!(s.retype(at, "   "), Err(LayoutError::EmptyCode(at)));
        s.set_kind(at, false).unwrap();
        assert_eq!(s.retype(at, "A99"), Err(LayoutError::NotASeat(at)));
    }

    #[test]
    fn retype_trims() {
        let mut s = store(Dimensions::new(1, 2, 2));
        let at = Coord::new(0, 0, 0);
        assert!(s.retype(at, "  C7 ").unwrap());
        assert_eq!(s.layout().get(at).unwrap().code, "C7");
    }

    #[test]
    fn observers_see_effective_changes_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut s = store(Dimensions::new(1, 2, 2));
        let sink = Arc::clone(&seen);
        s.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        let at = Coord::new(0, 0, 0);
        s.click(at, ToolMode::Seat).unwrap(); // already a seat, no-op
        s.click(at, ToolMode::Path).unwrap();
        s.replace(empty_layout(Dimensions::new(2, 3, 3)));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                LayoutChange::Cell {
                    coord: at,
                    before: Cell::seat("A01"),
                    after: Cell::path(),
                },
                LayoutChange::Replaced {
                    dimensions: Dimensions::new(2, 3, 3)
                },
            ]
        );
    }

    fn any_layout() -> impl Strategy<Value = SeatLayout> {
        (1usize..=2, 2usize..=6, 2usize..=5)
            .prop_flat_map(|(d, r, c)| {
                let dims = Dimensions::new(d, r, c);
                proptest::collection::vec(proptest::option::of("[A-Z][0-9]{2}"), dims.cell_count())
                    .prop_map(move |codes| {
                        let mut codes = codes.into_iter();
                        SeatLayout::from_fn(dims, |_| match codes.next().flatten() {
                            Some(code) => Cell::seat(code),
                            None => Cell::path(),
                        })
                    })
            })
    }

    proptest! {
        #[test]
        fn path_click_always_yields_empty_path(
            layout in any_layout(),
            pick in any::<prop::sample::Index>(),
        ) {
            let coords: Vec<_> = layout.cells().map(|(c, _)| c).collect();
            let at = coords[pick.index(coords.len())];
            let mut s = LayoutStore::new(layout);
            s.click(at, ToolMode::Path).unwrap();
            prop_assert_eq!(s.layout().get(at), Some(&Cell::path()));
        }

        #[test]
        fn edit_click_on_path_never_mutates(
            layout in any_layout(),
            pick in any::<prop::sample::Index>(),
        ) {
            let coords: Vec<_> = layout
                .cells()
                .filter(|(_, c)| c.is_path())
                .map(|(c, _)| c)
                .collect();
            prop_assume!(!coords.is_empty());
            let at = coords[pick.index(coords.len())];
            let before = layout.clone();
            let mut s = LayoutStore::new(layout);
            prop_assert_eq!(s.click(at, ToolMode::Edit).unwrap(), ClickOutcome::Ignored);
            prop_assert_eq!(s.layout(), &before);
        }
    }
}
