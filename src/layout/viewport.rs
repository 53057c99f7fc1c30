//! Viewport state: scroll offset plus visible size.

use super::PositionTable;
use crate::cell_ref::Range;

/// The visible window over the grid, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position
    pub scroll_x: f32,
    /// Vertical scroll position
    pub scroll_y: f32,
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Visible entries (inclusive) along one axis, `None` for an empty table.
    ///
    /// A scroll position before the first entry clamps to index 0.
    pub fn visible_span(table: &mut PositionTable, scroll: f32, size: f32) -> Option<(usize, usize)> {
        if table.is_empty() {
            return None;
        }
        let start = table.index_for_offset(scroll).unwrap_or(0);
        let end = table.index_for_offset(scroll + size.max(0.0)).unwrap_or(0);
        Some((start, end.max(start)))
    }

    /// Range of cells intersecting the viewport, [`Range::INVALID`] when
    /// either axis is empty.
    pub fn visible_range(&self, rows: &mut PositionTable, columns: &mut PositionTable) -> Range {
        let Some((row_start, row_end)) = Self::visible_span(rows, self.scroll_y, self.height) else {
            return Range::INVALID;
        };
        let Some((col_start, col_end)) = Self::visible_span(columns, self.scroll_x, self.width)
        else {
            return Range::INVALID;
        };
        Range::cells(row_start, col_start, row_end, col_end)
    }

    /// Clamp scroll position so the content end stays reachable.
    pub fn clamp_scroll(&mut self, rows: &mut PositionTable, columns: &mut PositionTable) {
        let max_x = (columns.extent() - self.width).max(0.0);
        let max_y = (rows.extent() - self.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Convert viewport-relative coordinates to grid coordinates
    pub fn to_grid(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }

    /// Convert grid coordinates to viewport-relative coordinates
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.scroll_x, y - self.scroll_y)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn tables() -> (PositionTable, PositionTable) {
        (
            PositionTable::with_sizes([10.0; 100], 0.0),
            PositionTable::with_sizes([50.0; 10], 0.0),
        )
    }

    #[test]
    fn test_visible_range_from_top() {
        let (mut rows, mut cols) = tables();
        let viewport = Viewport::new(99.0, 95.0);
        assert_eq!(
            viewport.visible_range(&mut rows, &mut cols),
            Range::cells(0, 0, 9, 1)
        );
    }

    #[test]
    fn test_visible_range_scrolled_and_clipped() {
        let (mut rows, mut cols) = tables();
        let mut viewport = Viewport::new(1000.0, 95.0);
        viewport.scroll_y = 50.0;
        assert_eq!(
            viewport.visible_range(&mut rows, &mut cols),
            Range::cells(5, 0, 14, 9)
        );
    }

    #[test]
    fn test_empty_axis_is_invalid() {
        let (mut rows, _) = tables();
        let mut cols = PositionTable::new(0.0);
        let viewport = Viewport::default();
        assert!(!viewport.visible_range(&mut rows, &mut cols).is_valid());
    }

    #[test]
    fn test_clamp_scroll() {
        let (mut rows, mut cols) = tables();
        let mut viewport = Viewport::new(100.0, 100.0);
        viewport.scroll_x = -20.0;
        viewport.scroll_y = 5000.0;
        viewport.clamp_scroll(&mut rows, &mut cols);
        assert_eq!(viewport.scroll_x, 0.0);
        assert_eq!(viewport.scroll_y, 900.0);
    }
}
