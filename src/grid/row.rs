//! Grid rows: shared row data, cached text, and widget bindings.

use std::cell::{BorrowError, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

use super::column::Column;
use crate::viewer::WidgetId;

/// Data object backing one row.
///
/// The label defaults to the object's `Display` output.
pub trait RowData: fmt::Display {
    fn name(&self) -> String {
        self.to_string()
    }

    /// Rename the object. Returns false when the object has no writable name.
    fn set_name(&mut self, _name: &str) -> bool {
        false
    }
}

/// Column -> widget table for one row.
type LookupTable = Vec<Option<WidgetId>>;

/// Free list of lookup tables keyed by their length.
#[derive(Debug, Default)]
pub struct LookupTablePool {
    free: HashMap<usize, Vec<LookupTable>>,
}

impl LookupTablePool {
    pub fn take(&mut self, size: usize) -> LookupTable {
        self.free
            .get_mut(&size)
            .and_then(Vec::pop)
            .unwrap_or_else(|| vec![None; size])
    }

    pub fn give(&mut self, mut table: LookupTable) {
        table.fill(None);
        self.free.entry(table.len()).or_default().push(table);
    }

    /// Number of pooled tables of `size`.
    pub fn pooled(&self, size: usize) -> usize {
        self.free.get(&size).map_or(0, Vec::len)
    }
}

/// One row of the grid.
pub struct Row<T> {
    data: Rc<RefCell<T>>,
    label: String,
    output: Vec<Option<String>>,
    /// Allocated on first bind, returned to the pool when the last cell unbinds
    cells: Option<LookupTable>,
    bound: usize,
    header: Option<WidgetId>,
}

impl<T: RowData> Row<T> {
    pub fn new(data: Rc<RefCell<T>>, columns: usize) -> Self {
        let label = data.try_borrow().map(|d| d.name()).unwrap_or_default();
        Self {
            data,
            label,
            output: vec![None; columns],
            cells: None,
            bound: 0,
            header: None,
        }
    }

    pub fn data(&self) -> &Rc<RefCell<T>> {
        &self.data
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cached text of a column, `None` if never rendered or empty.
    pub fn text(&self, column: usize) -> Option<&str> {
        self.output.get(column).and_then(Option::as_deref)
    }

    pub fn output(&self) -> &[Option<String>] {
        &self.output
    }

    pub fn header(&self) -> Option<WidgetId> {
        self.header
    }

    pub fn has_lookup_table(&self) -> bool {
        self.cells.is_some()
    }

    /// Refresh the label and the cached text of `columns`.
    ///
    /// Fails without touching the cache if the row data is mutably borrowed.
    pub(crate) fn render(
        &mut self,
        columns: &[Column<T>],
        span: RangeInclusive<usize>,
    ) -> Result<(), BorrowError> {
        let data = self.data.try_borrow()?;
        self.label = data.name();
        for (index, column) in columns.iter().enumerate() {
            if !span.contains(&index) {
                continue;
            }
            if let Some(slot) = self.output.get_mut(index) {
                *slot = column.get(&data).render();
            }
        }
        Ok(())
    }

    pub(crate) fn refresh_label(&mut self) -> Result<(), BorrowError> {
        self.label = self.data.try_borrow()?.name();
        Ok(())
    }

    pub(crate) fn widget(&self, column: usize) -> Option<WidgetId> {
        self.cells.as_ref()?.get(column).copied().flatten()
    }

    /// Bind `widget` to `column`, returning the widget previously bound there.
    pub(crate) fn bind(
        &mut self,
        column: usize,
        widget: WidgetId,
        pool: &mut LookupTablePool,
    ) -> Option<WidgetId> {
        let size = self.output.len();
        if column >= size {
            return None;
        }
        let table = self.cells.get_or_insert_with(|| pool.take(size));
        let slot = table.get_mut(column)?;
        let previous = slot.replace(widget);
        if previous.is_none() {
            self.bound += 1;
        }
        previous
    }

    pub(crate) fn unbind(&mut self, column: usize, pool: &mut LookupTablePool) -> Option<WidgetId> {
        let widget = self.cells.as_mut()?.get_mut(column)?.take()?;
        self.bound = self.bound.saturating_sub(1);
        if self.bound == 0 {
            if let Some(table) = self.cells.take() {
                pool.give(table);
            }
        }
        Some(widget)
    }

    pub(crate) fn bind_header(&mut self, widget: WidgetId) -> Option<WidgetId> {
        self.header.replace(widget)
    }

    pub(crate) fn unbind_header(&mut self) -> Option<WidgetId> {
        self.header.take()
    }

    /// Drop every binding, returning the widgets that were bound.
    pub(crate) fn release(&mut self, pool: &mut LookupTablePool) -> Vec<WidgetId> {
        let mut widgets: Vec<WidgetId> = self.header.take().into_iter().collect();
        if let Some(table) = self.cells.take() {
            widgets.extend(table.iter().flatten());
            pool.give(table);
        }
        self.bound = 0;
        widgets
    }

    /// Match the number of columns. Bound widgets past the new end are dropped.
    pub(crate) fn resize(&mut self, columns: usize, pool: &mut LookupTablePool) -> Vec<WidgetId> {
        self.output.resize(columns, None);
        let Some(old) = self.cells.take() else {
            return Vec::new();
        };
        let mut table = pool.take(columns);
        let mut dropped = Vec::new();
        for (column, widget) in old.iter().enumerate() {
            let Some(widget) = *widget else { continue };
            match table.get_mut(column) {
                Some(slot) => *slot = Some(widget),
                None => dropped.push(widget),
            }
        }
        pool.give(old);
        self.bound = table.iter().flatten().count();
        if self.bound == 0 {
            pool.give(table);
        } else {
            self.cells = Some(table);
        }
        dropped
    }
}

impl<T> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("label", &self.label)
            .field("output", &self.output)
            .field("bound", &self.bound)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}
