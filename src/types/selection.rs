//! Multi-range selection state and its text form.

use crate::cell_ref::{Coordinate, Range, Span};
use crate::error::{GridError, Result};
use crate::grid::{GridModel, RowData};
use crate::viewer::{join_records, split_records};

/// Active cell, the range being dragged, and ranges committed earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    committed: Vec<Range>,
    /// Range under the pointer drag; [`Range::INVALID`] when none
    live: Range,
    active: Coordinate,
    dragging: bool,
}

/// Outcome of a paste.
#[derive(Debug, Default)]
pub struct PasteReport {
    /// Coordinates written successfully.
    pub applied: Vec<Coordinate>,
    /// Coordinates that rejected their text, with the reason.
    pub errors: Vec<(Coordinate, GridError)>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Coordinate {
        self.active
    }

    pub fn live(&self) -> Range {
        self.live
    }

    pub fn committed(&self) -> &[Range] {
        &self.committed
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_empty(&self) -> bool {
        !self.active.is_valid() && !self.live.is_valid() && self.committed.is_empty()
    }

    /// Start a drag at `position`. Returns the previously active coordinate
    /// so its widget can leave the interactive state.
    pub fn begin(&mut self, position: Coordinate) -> Coordinate {
        let previous = std::mem::replace(&mut self.active, position);
        self.live = Range::single(position);
        self.dragging = position.is_valid();
        previous
    }

    /// Move the live range's far corner while dragging.
    pub fn extend(&mut self, position: Coordinate) -> bool {
        if !self.dragging || !position.is_valid() || self.live.end == position {
            return false;
        }
        self.live.end = position;
        true
    }

    pub fn end(&mut self) {
        self.dragging = false;
    }

    /// Move the live range into the committed list.
    pub fn commit(&mut self) {
        if self.live.is_valid() {
            self.committed.push(self.live);
        }
        self.live = Range::INVALID;
        self.dragging = false;
    }

    pub fn add_range(&mut self, range: Range) {
        if range.is_valid() {
            self.committed.push(range);
        }
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.live = Range::INVALID;
        self.active = Coordinate::Invalid;
        self.dragging = false;
    }

    pub fn is_selected(&self, position: Coordinate) -> bool {
        if !position.is_valid() {
            return false;
        }
        self.active == position
            || self.live.contains(position)
            || self.committed.iter().any(|range| range.contains(position))
    }

    /// Smallest span covering the active cell, the live range and every
    /// committed range.
    pub fn bounding_box(&self) -> Option<Span> {
        std::iter::once(Range::single(self.active))
            .chain(std::iter::once(self.live))
            .chain(self.committed.iter().copied())
            .filter_map(|range| range.span())
            .reduce(|a, b| a.merge(&b))
    }

    /// Move the active cell by a row/column delta, clamped to `bounds`, and
    /// make it the only selection. With no active cell the top-left of
    /// `bounds` becomes active.
    pub fn move_active(&mut self, rows: i64, columns: i64, bounds: &Range) -> Coordinate {
        let Some(span) = bounds.span() else {
            return self.active;
        };
        let target = if self.active.is_valid() {
            Coordinate::from_indices(
                self.active
                    .row_index()
                    .saturating_add(rows)
                    .clamp(span.min_row, span.max_row),
                self.active
                    .column_index()
                    .saturating_add(columns)
                    .clamp(span.min_column, span.max_column),
            )
        } else {
            Coordinate::from_indices(span.min_row, span.min_column)
        };
        self.clear();
        self.begin(target);
        self.end();
        target
    }

    /// Tab/newline separated text of the bounding box.
    ///
    /// Row `-1` carries column labels and column `-1` row labels; the corner
    /// is empty. Fields containing tabs, newlines or quotes are quoted.
    pub fn serialize_to_text<T: RowData>(&self, grid: &GridModel<T>) -> Result<String> {
        let Some(span) = self.bounding_box() else {
            return Ok(String::new());
        };
        join_records((span.min_row..=span.max_row).map(|row| {
            (span.min_column..=span.max_column)
                .map(move |column| cell_text(grid, Coordinate::from_indices(row, column)))
        }))
    }

    /// Write tab/newline separated `text` starting at `anchor`.
    ///
    /// The anchor may sit on a header axis: the first record then relabels
    /// column headers and/or the first field of each record renames rows.
    /// An invalid anchor stands for the header corner, whose field is
    /// skipped. Every other field is attempted; rejected ones are collected
    /// in the report instead of aborting the paste.
    pub fn deserialize_and_apply<T: RowData>(
        &self,
        text: &str,
        anchor: Coordinate,
        grid: &mut GridModel<T>,
    ) -> PasteReport {
        let mut report = PasteReport::default();
        let records = match split_records(text) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, "unreadable clipboard text");
                report.errors.push((anchor, err));
                return report;
            }
        };
        let (row, column) = (anchor.row_index(), anchor.column_index());
        for (dr, record) in (0_i64..).zip(records) {
            for (dc, field) in (0_i64..).zip(record) {
                let target =
                    Coordinate::from_indices(row.saturating_add(dr), column.saturating_add(dc));
                if !target.is_valid() {
                    continue;
                }
                match grid.set_cell(target, &field) {
                    Ok(()) => report.applied.push(target),
                    Err(err) => report.errors.push((target, err)),
                }
            }
        }
        report
    }
}

/// Text copied for one coordinate. Data cells are read through the getter so
/// rows that were never rendered still copy their value.
fn cell_text<T: RowData>(grid: &GridModel<T>, position: Coordinate) -> String {
    let text = match position {
        Coordinate::Cell { .. } => grid.value(position).ok().and_then(|value| value.render()),
        _ => grid.text(position),
    };
    text.unwrap_or_default()
}
