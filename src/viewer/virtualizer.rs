//! Visible-range virtualization.
//!
//! Only the coordinates inside the rendered range own a widget. When the
//! range changes, the old and new ranges are diffed: widgets leaving the
//! range go back to the [`CellPool`], coordinates entering it get a widget
//! from the pool (or a fresh one from the [`CellFactory`]).
//!
//! A pass runs in two halves. [`Virtualizer::refresh_cells`] diffs and
//! removes, then suspends; the host's next [`Virtualizer::tick`] adds,
//! re-renders the visible rows, and heals any coordinate left without a
//! widget. Requests arriving while a pass is suspended overwrite a single
//! pending slot and run after the current pass completes.

use tracing::{debug, trace, warn};

use super::pool::{CellFactory, CellPool, WidgetId};
use crate::cell_ref::{Coordinate, Range};
use crate::error::GridError;
use crate::grid::{GridModel, RowData};

/// Where the current pass is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Diffing,
    Removing,
    /// Removal done, waiting for the host to call `tick`.
    AwaitingTick,
    Adding,
    RefreshingVisible,
}

/// Coordinates to unbind and to bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub remove: Vec<Coordinate>,
    pub add: Vec<Coordinate>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }

    fn extend(&mut self, other: Diff) {
        self.remove.extend(other.remove);
        self.add.extend(other.add);
    }
}

/// Diff two rendered ranges.
///
/// Coordinates in both ranges are kept unless `is_bound` says they lost
/// their widget, in which case they are re-added. An invalid `new` removes
/// everything in `old`.
pub fn diff(old: &Range, new: &Range, is_bound: impl Fn(Coordinate) -> bool) -> Diff {
    let mut out = Diff::default();
    for position in old.union(new).iter() {
        match (old.contains(position), new.contains(position)) {
            (true, true) if !is_bound(position) => out.add.push(position),
            (true, false) => out.remove.push(position),
            (false, true) => out.add.push(position),
            _ => {}
        }
    }
    out
}

/// Row header cells for the rows of `range`.
pub fn row_header_range(range: &Range) -> Range {
    range.span().map_or(Range::INVALID, |s| {
        Range::new(
            Coordinate::from_indices(s.min_row, -1),
            Coordinate::from_indices(s.max_row, -1),
        )
    })
}

/// Column header cells for the columns of `range`.
pub fn column_header_range(range: &Range) -> Range {
    range.span().map_or(Range::INVALID, |s| {
        Range::new(
            Coordinate::from_indices(-1, s.min_column),
            Coordinate::from_indices(-1, s.max_column),
        )
    })
}

/// What a completed pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Range rendered once the pass completed.
    pub range: Range,
    pub removed: Vec<Coordinate>,
    pub added: Vec<Coordinate>,
    /// Coordinates found without a widget after adding, then repaired.
    pub healed: Vec<Coordinate>,
    /// Binding conflicts found along the way.
    pub anomalies: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Virtualizer {
    phase: Phase,
    /// Range bound by the last completed pass
    rendered: Range,
    /// Range of the pass in flight
    target: Range,
    pending: Option<Range>,
    to_add: Vec<Coordinate>,
    report: PassReport,
}

impl Virtualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Range bound by the last completed pass.
    pub fn rendered(&self) -> Range {
        self.rendered
    }

    /// Range queued behind the pass in flight.
    pub fn pending(&self) -> Option<Range> {
        self.pending
    }

    /// Start a pass towards `range`, or queue it if a pass is in flight.
    ///
    /// Runs the diff and the removal half immediately; the addition half waits
    /// for [`tick`](Self::tick).
    pub fn refresh_cells<T: RowData>(
        &mut self,
        range: Range,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) {
        if !self.is_idle() {
            if let Some(replaced) = self.pending.replace(range) {
                debug!(%replaced, %range, "coalesced pending refresh");
            } else {
                debug!(%range, "queued refresh behind running pass");
            }
            return;
        }

        self.phase = Phase::Diffing;
        let range = if range.is_valid() {
            range.intersection(&grid.all_range())
        } else {
            range
        };
        let changes = self.diff_all(&range, grid);
        debug!(
            from = %self.rendered,
            to = %range,
            remove = changes.remove.len(),
            add = changes.add.len(),
            "starting pass"
        );

        self.phase = Phase::Removing;
        self.target = range;
        self.report = PassReport {
            range,
            ..PassReport::default()
        };
        for position in changes.remove {
            if Self::remove(position, grid, pool, factory) {
                self.report.removed.push(position);
            }
        }
        // Later passes diff against the target even before it is reached.
        self.rendered = range;
        self.to_add = changes.add;
        self.phase = Phase::AwaitingTick;
    }

    /// Resume a suspended pass. Returns the report when a pass completed.
    ///
    /// A queued range starts its own pass right after, which in turn waits
    /// for the next tick.
    pub fn tick<T: RowData>(
        &mut self,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) -> Option<PassReport> {
        if self.phase != Phase::AwaitingTick {
            return None;
        }

        self.phase = Phase::Adding;
        for position in std::mem::take(&mut self.to_add) {
            if Self::add(position, grid, pool, factory, &mut self.report.anomalies) {
                self.report.added.push(position);
            }
        }

        self.phase = Phase::RefreshingVisible;
        let target = self.target;
        self.refresh_visible(&target, grid, factory);
        for position in self.covered(&target, grid) {
            if grid.widget_at(position).is_some() {
                continue;
            }
            warn!(%position, "visible cell has no widget, creating one");
            if Self::add(position, grid, pool, factory, &mut self.report.anomalies) {
                Self::push_text(position, grid, factory);
                self.report.healed.push(position);
            }
        }

        self.phase = Phase::Idle;
        let report = std::mem::take(&mut self.report);
        debug!(
            range = %report.range,
            removed = report.removed.len(),
            added = report.added.len(),
            healed = report.healed.len(),
            "pass complete"
        );

        if let Some(next) = self.pending.take() {
            self.refresh_cells(next, grid, pool, factory);
        }
        Some(report)
    }

    /// Tick until no pass is in flight.
    pub fn flush<T: RowData>(
        &mut self,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) -> Vec<PassReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.tick(grid, pool, factory) {
            reports.push(report);
        }
        reports
    }

    /// Re-render every row of `range` and push text and position to bound
    /// widgets.
    pub fn refresh_visible<T: RowData>(
        &self,
        range: &Range,
        grid: &mut GridModel<T>,
        factory: &mut dyn CellFactory,
    ) {
        let failed = grid.render_range(range);
        if failed > 0 {
            debug!(failed, "rows skipped while refreshing");
        }
        for position in self.covered(range, grid) {
            let Some(widget) = grid.widget_at(position) else {
                continue;
            };
            if let Some(rect) = grid.cell_rect(position) {
                factory.set_position(widget, rect);
            }
            Self::push_text(position, grid, factory);
        }
    }

    /// Bind `widget` to `position`.
    ///
    /// Binding the widget already there is a no-op. A different widget
    /// already bound there is released to the pool and the conflict logged.
    pub fn bind<T: RowData>(
        position: Coordinate,
        widget: WidgetId,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
        anomalies: &mut Vec<String>,
    ) -> crate::error::Result<()> {
        match grid.widget_at(position) {
            Some(existing) if existing == widget => return Ok(()),
            Some(stale) => {
                let conflict = GridError::Binding(format!(
                    "{position} already bound to widget {}, releasing it for {}",
                    stale.0, widget.0
                ));
                warn!(%conflict, "double bind");
                anomalies.push(conflict.to_string());
                if let Some(stale) = grid.unbind(position) {
                    Self::free(stale, pool, factory);
                }
            }
            None => {}
        }
        grid.bind(position, widget)?;
        Ok(())
    }

    fn diff_all<T: RowData>(&self, range: &Range, grid: &GridModel<T>) -> Diff {
        let is_bound = |position| grid.widget_at(position).is_some();
        let mut changes = diff(&self.rendered, range, is_bound);
        let config = grid.config();
        let no_headers = Range::INVALID;
        if config.show_row_headers || self.rendered_has_headers(grid, true) {
            let new = if config.show_row_headers { row_header_range(range) } else { no_headers };
            changes.extend(diff(&row_header_range(&self.rendered), &new, is_bound));
        }
        if config.show_column_headers || self.rendered_has_headers(grid, false) {
            let new = if config.show_column_headers { column_header_range(range) } else { no_headers };
            changes.extend(diff(&column_header_range(&self.rendered), &new, is_bound));
        }
        changes
    }

    /// Whether headers of the rendered range still hold widgets (after
    /// header display was switched off).
    fn rendered_has_headers<T: RowData>(&self, grid: &GridModel<T>, rows: bool) -> bool {
        let headers = if rows {
            row_header_range(&self.rendered)
        } else {
            column_header_range(&self.rendered)
        };
        headers.iter().any(|position| grid.widget_at(position).is_some())
    }

    /// Cells of `range` plus the header cells shown for it.
    fn covered<T: RowData>(&self, range: &Range, grid: &GridModel<T>) -> Vec<Coordinate> {
        let mut positions: Vec<Coordinate> = range.iter().collect();
        if grid.config().show_row_headers {
            positions.extend(row_header_range(range).iter());
        }
        if grid.config().show_column_headers {
            positions.extend(column_header_range(range).iter());
        }
        positions
    }

    fn remove<T: RowData>(
        position: Coordinate,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) -> bool {
        let Some(widget) = grid.unbind(position) else {
            return false;
        };
        trace!(%position, ?widget, "removing cell");
        Self::free(widget, pool, factory);
        true
    }

    fn free(widget: WidgetId, pool: &mut CellPool, factory: &mut dyn CellFactory) {
        factory.deactivate(widget);
        factory.set_text(widget, "");
        pool.release(widget);
    }

    fn add<T: RowData>(
        position: Coordinate,
        grid: &mut GridModel<T>,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
        anomalies: &mut Vec<String>,
    ) -> bool {
        let (Some(cell_type), Some(rect)) = (grid.cell_type(position), grid.cell_rect(position)) else {
            debug!(%position, "skipping cell outside the grid");
            return false;
        };
        let widget = pool.acquire(cell_type, factory);
        factory.activate(widget);
        factory.set_interactable(widget, false);
        if let Err(err) = Self::bind(position, widget, grid, pool, factory, anomalies) {
            warn!(%position, error = %err, "could not bind cell");
            Self::free(widget, pool, factory);
            return false;
        }
        trace!(%position, ?widget, "adding cell");
        factory.set_position(widget, rect);
        Self::push_text(position, grid, factory);
        true
    }

    fn push_text<T: RowData>(position: Coordinate, grid: &GridModel<T>, factory: &mut dyn CellFactory) {
        if let Some(widget) = grid.widget_at(position) {
            factory.set_text(widget, grid.text(position).as_deref().unwrap_or_default());
        }
    }
}
