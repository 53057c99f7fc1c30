//! Cell editing on top of `GridView`.
//!
//! One cell is edited at a time. Committing runs the column setter; text the
//! setter rejects keeps the edit open, flags the cell and reports where in the
//! text the problem is.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::cell_ref::Coordinate;
use crate::error::{GridError, Result};
use crate::grid::RowData;
use crate::viewer::{CellFactory, GridView};

/// A committed cell edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    /// The new value as entered by the user.
    pub value: String,
}

/// Why a commit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditRejection {
    pub position: Coordinate,
    pub message: String,
    /// Zero-based (line, column) of the offending character, for parse errors.
    pub caret: Option<(usize, usize)>,
    /// Character offset of the offending character, for parse errors.
    pub offset: Option<usize>,
}

impl EditRejection {
    fn new(position: Coordinate, err: &GridError) -> Self {
        match err {
            GridError::Parse(parse) => Self {
                position,
                message: parse.message.clone(),
                caret: Some(parse.caret()),
                offset: Some(parse.offset),
            },
            other => Self {
                position,
                message: other.to_string(),
                caret: None,
                offset: None,
            },
        }
    }
}

impl fmt::Display for EditRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.caret {
            Some((line, column)) => write!(
                f,
                "{}: {} (line {}, column {})",
                self.position,
                self.message,
                line + 1,
                column + 1
            ),
            None => write!(f, "{}: {}", self.position, self.message),
        }
    }
}

/// Edit session state.
#[derive(Debug, Default)]
pub struct CellEditor {
    editing: Option<Coordinate>,
    dirty_cells: HashMap<Coordinate, CellEdit>,
    /// Cells whose last commit was rejected
    errors: HashMap<Coordinate, EditRejection>,
}

impl CellEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(&self) -> Option<Coordinate> {
        self.editing
    }

    /// Open an edit on `position` and return the text to start from.
    pub fn begin_edit<T: RowData>(&mut self, view: &GridView<T>, position: Coordinate) -> Result<String> {
        let grid = view.grid();
        if !grid.contains(position) {
            return Err(GridError::OutOfRange(position));
        }
        if grid.is_read_only(position) {
            return Err(GridError::ReadOnly(position));
        }
        let text = match position {
            Coordinate::Cell { .. } => grid.value(position)?.render(),
            _ => grid.text(position),
        };
        tracing::debug!(%position, "begin edit");
        self.editing = Some(position);
        Ok(text.unwrap_or_default())
    }

    /// Write `text` into the cell being edited.
    ///
    /// On success the edit closes, the error flag clears and the cell is
    /// recorded as dirty. On failure the edit stays open and the cell is
    /// flagged with the rejection message.
    pub fn commit_edit<T: RowData>(
        &mut self,
        view: &mut GridView<T>,
        text: &str,
        factory: &mut dyn CellFactory,
    ) -> std::result::Result<Coordinate, EditRejection> {
        let Some(position) = self.editing else {
            return Err(EditRejection::new(
                Coordinate::Invalid,
                &GridError::Other("no edit in progress".into()),
            ));
        };
        match view.set_cell(position, text, factory) {
            Ok(()) => {
                tracing::debug!(%position, "edit committed");
                self.editing = None;
                self.errors.remove(&position);
                self.dirty_cells.insert(
                    position,
                    CellEdit {
                        value: text.to_string(),
                    },
                );
                Ok(position)
            }
            Err(err) => {
                let rejection = EditRejection::new(position, &err);
                tracing::debug!(%rejection, "edit rejected");
                if let Some(widget) = view.grid().widget_at(position) {
                    factory.set_error(widget, Some(&rejection.to_string()));
                }
                self.errors.insert(position, rejection.clone());
                Err(rejection)
            }
        }
    }

    /// Abandon the open edit. The cell keeps its last committed value; an
    /// error message from a rejected commit is cleared.
    pub fn cancel_edit<T: RowData>(&mut self, view: &GridView<T>, factory: &mut dyn CellFactory) {
        let Some(position) = self.editing.take() else {
            return;
        };
        if self.errors.remove(&position).is_some() {
            if let Some(widget) = view.grid().widget_at(position) {
                factory.set_error(widget, None);
            }
        }
    }

    /// Cells changed by committed edits.
    pub fn dirty_cells(&self) -> impl Iterator<Item = (&Coordinate, &CellEdit)> {
        self.dirty_cells.iter()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_cells.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty_cells.clear();
    }

    /// Rejection recorded for `position`, if its last commit failed.
    pub fn error(&self, position: Coordinate) -> Option<&EditRejection> {
        self.errors.get(&position)
    }
}
