//! Grid model: rows over shared data objects, columns with accessors, and
//! the position tables for both axes.
//!
//! The model also stores which widget is bound to each visible coordinate
//! (per-row lookup tables, row header slots, column header slots). The
//! virtualizer is the only writer of those bindings.

mod column;
mod row;

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use serde::Serialize;

pub use column::{CellTypeId, Column, Getter, Setter};
pub use row::{LookupTablePool, Row, RowData};

use crate::cell_ref::{Coordinate, Range};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::layout::{PositionTable, Viewport};
use crate::types::CellValue;
use crate::viewer::WidgetId;

/// Position and size of a cell in grid coordinates. Header cells sit at
/// negative offsets, left of (or above) the first data cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub struct GridModel<T> {
    rows: Vec<Row<T>>,
    columns: Vec<Column<T>>,
    column_headers: Vec<Option<WidgetId>>,
    row_positions: PositionTable,
    column_positions: PositionTable,
    tables: LookupTablePool,
    /// Scroll position the header strips are pinned to
    header_origin: (f32, f32),
    config: GridConfig,
}

impl<T: RowData> GridModel<T> {
    pub fn new(config: GridConfig) -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            column_headers: Vec::new(),
            row_positions: PositionTable::new(config.cell_padding.height),
            column_positions: PositionTable::new(config.cell_padding.width),
            tables: LookupTablePool::default(),
            header_origin: (0.0, 0.0),
            config,
        }
    }

    pub fn with_columns(config: GridConfig, columns: impl IntoIterator<Item = Column<T>>) -> Self {
        let mut grid = Self::new(config);
        for column in columns {
            grid.add_column(column);
        }
        grid
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn add_column(&mut self, column: Column<T>) -> usize {
        let width = column.width.unwrap_or(self.config.default_cell_size.width);
        self.column_positions.push(width);
        self.columns.push(column);
        self.column_headers.push(None);
        let count = self.columns.len();
        for row in &mut self.rows {
            // Growing never drops bindings.
            let _ = row.resize(count, &mut self.tables);
        }
        count - 1
    }

    pub fn push_row(&mut self, data: Rc<RefCell<T>>) -> usize {
        self.rows.push(Row::new(data, self.columns.len()));
        self.row_positions.push(self.config.default_cell_size.height);
        self.rows.len() - 1
    }

    /// Replace every row. Returns the widgets that were bound to the old rows;
    /// the caller owns them again.
    pub fn set_objects(&mut self, objects: impl IntoIterator<Item = Rc<RefCell<T>>>) -> Vec<WidgetId> {
        let mut released = Vec::new();
        for row in &mut self.rows {
            released.extend(row.release(&mut self.tables));
        }
        self.rows.clear();
        self.row_positions.set_sizes(std::iter::empty());
        for data in objects {
            self.push_row(data);
        }
        released
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row<T>> {
        self.rows.get(index)
    }

    pub fn column(&self, index: usize) -> Option<&Column<T>> {
        self.columns.get(index)
    }

    pub fn row_data(&self, index: usize) -> Option<Rc<RefCell<T>>> {
        self.rows.get(index).map(|row| Rc::clone(row.data()))
    }

    pub fn lookup_tables(&self) -> &LookupTablePool {
        &self.tables
    }

    /// Every data cell, [`Range::INVALID`] for an empty grid.
    pub fn all_range(&self) -> Range {
        match (self.rows.len().checked_sub(1), self.columns.len().checked_sub(1)) {
            (Some(last_row), Some(last_column)) => Range::cells(0, 0, last_row, last_column),
            _ => Range::INVALID,
        }
    }

    pub fn contains(&self, position: Coordinate) -> bool {
        match position {
            Coordinate::Cell { row, column } => row < self.rows.len() && column < self.columns.len(),
            Coordinate::RowHeader(row) => row < self.rows.len(),
            Coordinate::ColumnHeader(column) => column < self.columns.len(),
            Coordinate::Invalid => false,
        }
    }

    // ---- sizes and positions ----

    pub fn set_row_height(&mut self, row: usize, height: f32) -> Result<()> {
        if self.row_positions.set_size(row, height) {
            Ok(())
        } else {
            Err(GridError::OutOfRange(Coordinate::RowHeader(row)))
        }
    }

    pub fn set_column_width(&mut self, column: usize, width: f32) -> Result<()> {
        if self.column_positions.set_size(column, width) {
            Ok(())
        } else {
            Err(GridError::OutOfRange(Coordinate::ColumnHeader(column)))
        }
    }

    pub fn set_padding(&mut self, column_gap: f32, row_gap: f32) {
        self.config.cell_padding.width = column_gap;
        self.config.cell_padding.height = row_gap;
        self.column_positions.set_padding(column_gap);
        self.row_positions.set_padding(row_gap);
    }

    pub fn row_height(&self, row: usize) -> Option<f32> {
        self.row_positions.size(row)
    }

    pub fn column_width(&self, column: usize) -> Option<f32> {
        self.column_positions.size(column)
    }

    pub fn row_offset(&mut self, row: usize) -> Option<f32> {
        self.row_positions.offset(row)
    }

    pub fn column_offset(&mut self, column: usize) -> Option<f32> {
        self.column_positions.offset(column)
    }

    /// Row and column position tables.
    pub fn positions_mut(&mut self) -> (&mut PositionTable, &mut PositionTable) {
        (&mut self.row_positions, &mut self.column_positions)
    }

    /// Total content size (excluding headers).
    pub fn content_size(&mut self) -> (f32, f32) {
        (self.column_positions.extent(), self.row_positions.extent())
    }

    /// Cells the viewport shows, clipped to the grid.
    pub fn visible_range(&mut self, viewport: &Viewport) -> Range {
        let visible = viewport.visible_range(&mut self.row_positions, &mut self.column_positions);
        visible.intersection(&self.all_range())
    }

    /// Pin the header strips to a scroll position: row headers keep their
    /// x at `scroll_x`, column headers their y at `scroll_y`.
    pub fn pin_headers(&mut self, scroll_x: f32, scroll_y: f32) {
        self.header_origin = (scroll_x, scroll_y);
    }

    /// Content-space rectangle of a coordinate. Header rects follow the
    /// content along their own axis and stay pinned on the other one.
    pub fn cell_rect(&mut self, position: Coordinate) -> Option<CellRect> {
        let header = self.config.header_size;
        let padding = self.config.cell_padding;
        let (origin_x, origin_y) = self.header_origin;
        match position {
            Coordinate::Cell { row, column } => Some(CellRect {
                x: self.column_positions.offset(column)?,
                y: self.row_positions.offset(row)?,
                width: self.column_positions.size(column)?,
                height: self.row_positions.size(row)?,
            }),
            Coordinate::RowHeader(row) => Some(CellRect {
                x: origin_x - (header.width + padding.width),
                y: self.row_positions.offset(row)?,
                width: header.width,
                height: self.row_positions.size(row)?,
            }),
            Coordinate::ColumnHeader(column) => Some(CellRect {
                x: self.column_positions.offset(column)?,
                y: origin_y - (header.height + padding.height),
                width: self.column_positions.size(column)?,
                height: header.height,
            }),
            Coordinate::Invalid => None,
        }
    }

    // ---- rendering ----

    /// Refresh the cached text of `columns` in one row.
    ///
    /// When the row data is mutably borrowed elsewhere the cache is left
    /// unchanged and [`GridError::RowBorrowed`] is returned.
    pub fn render_row(&mut self, row: usize, columns: RangeInclusive<usize>) -> Result<()> {
        let target = self
            .rows
            .get_mut(row)
            .ok_or(GridError::OutOfRange(Coordinate::RowHeader(row)))?;
        target.render(&self.columns, columns).map_err(|_| {
            tracing::warn!(row, "row data is borrowed, keeping cached text");
            GridError::RowBorrowed(row)
        })
    }

    /// Render every row of `range` for its column span. Returns the number of
    /// rows that could not be rendered.
    pub fn render_range(&mut self, range: &Range) -> usize {
        let Some(span) = range.intersection(&self.all_range()).span() else {
            return 0;
        };
        let (Ok(r0), Ok(r1), Ok(c0), Ok(c1)) = (
            usize::try_from(span.min_row),
            usize::try_from(span.max_row),
            usize::try_from(span.min_column),
            usize::try_from(span.max_column),
        ) else {
            return 0;
        };
        (r0..=r1)
            .filter(|&row| self.render_row(row, c0..=c1).is_err())
            .count()
    }

    /// Display text of a coordinate: cached cell text, or a header label.
    pub fn text(&self, position: Coordinate) -> Option<String> {
        match position {
            Coordinate::Cell { row, column } => self.rows.get(row)?.text(column).map(str::to_string),
            Coordinate::RowHeader(row) => self.rows.get(row).map(|r| r.label().to_string()),
            Coordinate::ColumnHeader(column) => self.columns.get(column).map(|c| c.label.clone()),
            Coordinate::Invalid => None,
        }
    }

    /// Current typed value of a data cell, read through the column getter.
    pub fn value(&self, position: Coordinate) -> Result<CellValue> {
        let Coordinate::Cell { row, column } = position else {
            return Err(GridError::OutOfRange(position));
        };
        let (Some(target), Some(col)) = (self.rows.get(row), self.columns.get(column)) else {
            return Err(GridError::OutOfRange(position));
        };
        let data = target
            .data()
            .try_borrow()
            .map_err(|_| GridError::RowBorrowed(row))?;
        Ok(col.get(&data))
    }

    pub fn cell_type(&self, position: Coordinate) -> Option<CellTypeId> {
        match position {
            Coordinate::Cell { column, .. } => self.columns.get(column).map(|c| c.cell_type),
            Coordinate::RowHeader(_) | Coordinate::ColumnHeader(_) => Some(CellTypeId::HEADER),
            Coordinate::Invalid => None,
        }
    }

    pub fn is_read_only(&self, position: Coordinate) -> bool {
        match position {
            Coordinate::Cell { column, .. } => self.columns.get(column).map_or(true, Column::is_read_only),
            Coordinate::RowHeader(_) | Coordinate::ColumnHeader(_) => false,
            Coordinate::Invalid => true,
        }
    }

    /// Write user text into a coordinate.
    ///
    /// Data cells go through the column setter and are re-rendered on success.
    /// A row header renames the row object, a column header relabels the column.
    pub fn set_cell(&mut self, position: Coordinate, text: &str) -> Result<()> {
        if !self.contains(position) {
            return Err(GridError::OutOfRange(position));
        }
        match position {
            Coordinate::Cell { row, column } => {
                let (Some(target), Some(col)) = (self.rows.get(row), self.columns.get(column)) else {
                    return Err(GridError::OutOfRange(position));
                };
                let mut data = target
                    .data()
                    .try_borrow_mut()
                    .map_err(|_| GridError::RowBorrowed(row))?;
                col.set(&mut *data, text)
                    .ok_or(GridError::ReadOnly(position))??;
                drop(data);
                self.render_row(row, column..=column)
            }
            Coordinate::RowHeader(row) => {
                let target = self
                    .rows
                    .get_mut(row)
                    .ok_or(GridError::OutOfRange(position))?;
                let renamed = target
                    .data()
                    .try_borrow_mut()
                    .map_err(|_| GridError::RowBorrowed(row))?
                    .set_name(text);
                if !renamed {
                    return Err(GridError::ReadOnly(position));
                }
                target.refresh_label().map_err(|_| GridError::RowBorrowed(row))
            }
            Coordinate::ColumnHeader(column) => {
                let col = self
                    .columns
                    .get_mut(column)
                    .ok_or(GridError::OutOfRange(position))?;
                col.label = text.to_string();
                Ok(())
            }
            Coordinate::Invalid => Err(GridError::OutOfRange(position)),
        }
    }

    // ---- widget bindings ----

    pub fn widget_at(&self, position: Coordinate) -> Option<WidgetId> {
        match position {
            Coordinate::Cell { row, column } => self.rows.get(row)?.widget(column),
            Coordinate::RowHeader(row) => self.rows.get(row)?.header(),
            Coordinate::ColumnHeader(column) => self.column_headers.get(column).copied().flatten(),
            Coordinate::Invalid => None,
        }
    }

    /// Bind `widget` to `position`, returning the widget previously bound.
    pub(crate) fn bind(&mut self, position: Coordinate, widget: WidgetId) -> Result<Option<WidgetId>> {
        if !self.contains(position) {
            return Err(GridError::OutOfRange(position));
        }
        Ok(match position {
            Coordinate::Cell { row, column } => self
                .rows
                .get_mut(row)
                .and_then(|r| r.bind(column, widget, &mut self.tables)),
            Coordinate::RowHeader(row) => self.rows.get_mut(row).and_then(|r| r.bind_header(widget)),
            Coordinate::ColumnHeader(column) => self
                .column_headers
                .get_mut(column)
                .and_then(|slot| slot.replace(widget)),
            Coordinate::Invalid => None,
        })
    }

    pub(crate) fn unbind(&mut self, position: Coordinate) -> Option<WidgetId> {
        match position {
            Coordinate::Cell { row, column } => self.rows.get_mut(row)?.unbind(column, &mut self.tables),
            Coordinate::RowHeader(row) => self.rows.get_mut(row)?.unbind_header(),
            Coordinate::ColumnHeader(column) => self.column_headers.get_mut(column)?.take(),
            Coordinate::Invalid => None,
        }
    }
}

impl<T> std::fmt::Debug for GridModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridModel")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::error::ParseError;
    use crate::parser::parse_float;
    use std::fmt;

    struct Item {
        name: String,
        weight: f64,
    }

    impl fmt::Display for Item {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.name)
        }
    }

    impl RowData for Item {
        fn set_name(&mut self, name: &str) -> bool {
            self.name = name.to_string();
            true
        }
    }

    fn grid(rows: usize) -> GridModel<Item> {
        let config = GridConfig {
            cell_padding: Size::new(0.0, 0.0),
            ..GridConfig::default()
        };
        let mut grid = GridModel::with_columns(
            config,
            [
                Column::new("Name", |i: &Item| i.name.as_str().into()),
                Column::new("Weight", |i: &Item| i.weight.into()).with_setter(
                    |i: &mut Item, text: &str| -> std::result::Result<(), ParseError> {
                        i.weight = parse_float(text)?;
                        Ok(())
                    },
                ),
            ],
        );
        grid.set_objects((0..rows).map(|i| {
            Rc::new(RefCell::new(Item {
                name: format!("item{i}"),
                weight: i as f64,
            }))
        }));
        grid
    }

    #[test]
    fn test_all_range_and_rects() {
        let mut grid = grid(3);
        assert_eq!(grid.all_range(), Range::cells(0, 0, 2, 1));
        assert_eq!(
            grid.cell_rect(Coordinate::cell(2, 1)),
            Some(CellRect {
                x: 100.0,
                y: 60.0,
                width: 100.0,
                height: 30.0
            })
        );
        assert_eq!(grid.cell_rect(Coordinate::RowHeader(1)).unwrap().x, -100.0);
        assert_eq!(grid.cell_rect(Coordinate::cell(3, 0)), None);

        grid.pin_headers(25.0, 40.0);
        let row_header = grid.cell_rect(Coordinate::RowHeader(1)).unwrap();
        assert_eq!((row_header.x, row_header.y), (-75.0, 30.0));
        let column_header = grid.cell_rect(Coordinate::ColumnHeader(1)).unwrap();
        assert_eq!((column_header.x, column_header.y), (100.0, 0.0));
        assert_eq!(grid.cell_rect(Coordinate::cell(2, 1)).unwrap().y, 60.0);
        assert!(!GridModel::<Item>::new(GridConfig::default()).all_range().is_valid());
    }

    #[test]
    fn test_size_changes_move_later_cells() {
        let mut grid = grid(3);
        grid.set_row_height(0, 50.0).unwrap();
        assert_eq!(grid.row_offset(2), Some(80.0));
        grid.set_padding(2.0, 1.0);
        assert_eq!(grid.row_offset(2), Some(82.0));
        assert_eq!(grid.column_offset(1), Some(102.0));
        assert!(matches!(
            grid.set_column_width(5, 1.0),
            Err(GridError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_render_and_set_cell() {
        let mut grid = grid(2);
        assert_eq!(grid.render_range(&grid.all_range()), 0);
        assert_eq!(grid.text(Coordinate::cell(1, 1)).as_deref(), Some("1"));

        grid.set_cell(Coordinate::cell(1, 1), "4.5").unwrap();
        assert_eq!(grid.text(Coordinate::cell(1, 1)).as_deref(), Some("4.5"));
        assert_eq!(grid.value(Coordinate::cell(1, 1)).unwrap(), CellValue::Number(4.5));

        let err = grid.set_cell(Coordinate::cell(1, 1), "heavy").unwrap_err();
        assert!(matches!(err, GridError::Parse(_)));
        assert_eq!(grid.text(Coordinate::cell(1, 1)).as_deref(), Some("4.5"));

        assert!(matches!(
            grid.set_cell(Coordinate::cell(0, 0), "x"),
            Err(GridError::ReadOnly(_))
        ));
        assert!(matches!(
            grid.set_cell(Coordinate::cell(9, 0), "x"),
            Err(GridError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_headers_rename() {
        let mut grid = grid(1);
        grid.set_cell(Coordinate::RowHeader(0), "apple").unwrap();
        assert_eq!(grid.text(Coordinate::RowHeader(0)).as_deref(), Some("apple"));
        grid.set_cell(Coordinate::ColumnHeader(1), "Mass").unwrap();
        assert_eq!(grid.text(Coordinate::ColumnHeader(1)).as_deref(), Some("Mass"));
    }

    #[test]
    fn test_borrowed_row_keeps_cache() {
        let mut grid = grid(1);
        grid.render_range(&grid.all_range());
        let data = grid.row_data(0).unwrap();
        let guard = data.borrow_mut();
        assert!(matches!(grid.render_row(0, 0..=1), Err(GridError::RowBorrowed(0))));
        assert!(matches!(
            grid.set_cell(Coordinate::cell(0, 1), "2"),
            Err(GridError::RowBorrowed(0))
        ));
        drop(guard);
        assert_eq!(grid.text(Coordinate::cell(0, 0)).as_deref(), Some("item0"));
    }

    #[test]
    fn test_bindings_per_family() {
        let mut grid = grid(2);
        assert_eq!(grid.bind(Coordinate::cell(0, 1), WidgetId(1)).unwrap(), None);
        assert_eq!(grid.bind(Coordinate::RowHeader(0), WidgetId(2)).unwrap(), None);
        assert_eq!(grid.bind(Coordinate::ColumnHeader(0), WidgetId(3)).unwrap(), None);
        assert_eq!(grid.widget_at(Coordinate::cell(0, 1)), Some(WidgetId(1)));
        assert_eq!(grid.widget_at(Coordinate::RowHeader(0)), Some(WidgetId(2)));
        assert_eq!(grid.widget_at(Coordinate::ColumnHeader(0)), Some(WidgetId(3)));
        assert!(grid.bind(Coordinate::cell(5, 0), WidgetId(4)).is_err());

        let released = grid.set_objects(Vec::new());
        assert_eq!(released.len(), 2);
        assert_eq!(grid.unbind(Coordinate::ColumnHeader(0)), Some(WidgetId(3)));
    }
}
