//! `GridView` - the composition root of the grid.
//!
//! Owns the model, the virtualizer, the selection and the viewport. The host
//! keeps the widget side: a [`CellPool`] (possibly shared between grids), a
//! [`CellFactory`] and a [`Clipboard`], passed in per call.
//!
//! Typical host loop:
//! - input events -> `pointer_down/move/up`, `scroll_by`, `move_active`
//! - once per frame -> `tick`, which completes the pending virtualization pass

mod clipboard;
mod pool;
mod scroll;
mod virtualizer;

use std::cell::RefCell;
use std::rc::Rc;

pub use clipboard::{join_records, split_records, Clipboard, MemoryClipboard};
pub use pool::{CellFactory, CellPool, WidgetId};
pub use virtualizer::{
    column_header_range, diff, row_header_range, Diff, PassReport, Phase, Virtualizer,
};

use crate::cell_ref::{Coordinate, Range};
use crate::error::Result;
use crate::grid::{GridModel, RowData};
use crate::layout::Viewport;
use crate::types::SelectionModel;

pub struct GridView<T> {
    grid: GridModel<T>,
    virtualizer: Virtualizer,
    selection: SelectionModel,
    viewport: Viewport,
}

impl<T: RowData> GridView<T> {
    pub fn new(mut grid: GridModel<T>, viewport: Viewport) -> Self {
        grid.pin_headers(viewport.scroll_x, viewport.scroll_y);
        Self {
            grid,
            virtualizer: Virtualizer::new(),
            selection: SelectionModel::new(),
            viewport,
        }
    }

    pub fn grid(&self) -> &GridModel<T> {
        &self.grid
    }

    /// Direct model access. Size or column changes take effect on the next
    /// [`refresh`](Self::refresh).
    pub fn grid_mut(&mut self) -> &mut GridModel<T> {
        &mut self.grid
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    /// Cells currently in view.
    pub fn visible_range(&mut self) -> Range {
        self.grid.visible_range(&self.viewport)
    }

    /// Request a pass towards the current visible range.
    pub fn refresh(&mut self, pool: &mut CellPool, factory: &mut dyn CellFactory) {
        let range = self.visible_range();
        self.virtualizer
            .refresh_cells(range, &mut self.grid, pool, factory);
    }

    /// Complete the suspended pass, if any.
    pub fn tick(&mut self, pool: &mut CellPool, factory: &mut dyn CellFactory) -> Option<PassReport> {
        let report = self.virtualizer.tick(&mut self.grid, pool, factory)?;
        for position in report.added.iter().chain(&report.healed) {
            if let Some(widget) = self.grid.widget_at(*position) {
                factory.set_selected(widget, self.selection.is_selected(*position));
            }
        }
        Some(report)
    }

    /// Replace the row objects and re-render.
    ///
    /// Every cell is torn down first, so the new rows start from a clean set
    /// of bindings.
    pub fn set_objects(
        &mut self,
        objects: Vec<Rc<RefCell<T>>>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) {
        self.release_all(pool, factory);
        for widget in self.grid.set_objects(objects) {
            factory.deactivate(widget);
            factory.set_text(widget, "");
            pool.release(widget);
        }
        self.selection.clear();
        self.refresh(pool, factory);
    }

    /// Remove every cell and clear the selection.
    pub fn teardown(&mut self, pool: &mut CellPool, factory: &mut dyn CellFactory) -> Vec<PassReport> {
        let reports = self.release_all(pool, factory);
        self.selection.clear();
        reports
    }

    fn release_all(&mut self, pool: &mut CellPool, factory: &mut dyn CellFactory) -> Vec<PassReport> {
        let mut reports = self.virtualizer.flush(&mut self.grid, pool, factory);
        self.virtualizer
            .refresh_cells(Range::INVALID, &mut self.grid, pool, factory);
        reports.extend(self.virtualizer.flush(&mut self.grid, pool, factory));
        reports
    }

    // ---- pointer and keyboard ----

    /// Coordinate under a viewport-relative point. Points left of (above) the
    /// viewport hit the row (column) headers, which do not scroll.
    pub fn coordinate_at(&mut self, x: f32, y: f32) -> Coordinate {
        let (gx, gy) = self.viewport.to_grid(x, y);
        let (rows, columns) = self.grid.positions_mut();
        let row = if y < 0.0 { Some(-1) } else { rows.index_for_offset(gy).map(to_axis) };
        let column = if x < 0.0 { Some(-1) } else { columns.index_for_offset(gx).map(to_axis) };
        match (row, column) {
            (Some(row), Some(column)) => Coordinate::from_indices(row, column),
            _ => Coordinate::Invalid,
        }
    }

    /// Start a selection at `position`. With `additive` the current range is
    /// kept as a committed range.
    pub fn pointer_down(&mut self, position: Coordinate, additive: bool, factory: &mut dyn CellFactory) {
        let previous = self.selection.active();
        if additive {
            self.selection.commit();
        } else {
            self.selection.clear();
        }
        self.selection.begin(position);
        if let Some(widget) = self.grid.widget_at(previous) {
            factory.set_interactable(widget, false);
        }
        if let Some(widget) = self.grid.widget_at(position) {
            factory.set_interactable(widget, true);
        }
        self.sync_selection(factory);
    }

    pub fn pointer_move(&mut self, position: Coordinate, factory: &mut dyn CellFactory) {
        if self.selection.extend(position) {
            self.sync_selection(factory);
        }
    }

    pub fn pointer_up(&mut self) {
        self.selection.end();
    }

    /// Arrow-key navigation.
    pub fn move_active(&mut self, rows: i64, columns: i64, factory: &mut dyn CellFactory) -> Coordinate {
        let previous = self.selection.active();
        let bounds = self.grid.all_range();
        let active = self.selection.move_active(rows, columns, &bounds);
        if let Some(widget) = self.grid.widget_at(previous) {
            factory.set_interactable(widget, false);
        }
        if let Some(widget) = self.grid.widget_at(active) {
            factory.set_interactable(widget, true);
        }
        self.sync_selection(factory);
        active
    }

    /// Push the selected flag to every bound widget.
    fn sync_selection(&self, factory: &mut dyn CellFactory) {
        let rendered = self.virtualizer.rendered();
        let cells = rendered.iter();
        let rows = row_header_range(&rendered).iter();
        let columns = column_header_range(&rendered).iter();
        for position in cells.chain(rows).chain(columns) {
            if let Some(widget) = self.grid.widget_at(position) {
                factory.set_selected(widget, self.selection.is_selected(position));
            }
        }
    }

    // ---- editing ----

    /// Write `text` into a cell and push the new text to its widget.
    pub fn set_cell(
        &mut self,
        position: Coordinate,
        text: &str,
        factory: &mut dyn CellFactory,
    ) -> Result<()> {
        self.grid.set_cell(position, text)?;
        self.push_cell(position, factory, None);
        Ok(())
    }

    /// Push a coordinate's current text and error message to its widget.
    pub(crate) fn push_cell(
        &self,
        position: Coordinate,
        factory: &mut dyn CellFactory,
        error: Option<&str>,
    ) {
        if let Some(widget) = self.grid.widget_at(position) {
            factory.set_text(widget, self.grid.text(position).as_deref().unwrap_or_default());
            factory.set_error(widget, error);
        }
    }
}

fn to_axis(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl<T> std::fmt::Debug for GridView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView")
            .field("grid", &self.grid)
            .field("virtualizer", &self.virtualizer)
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .finish()
    }
}
