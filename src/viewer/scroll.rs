//! Scroll and resize handling for `GridView`.
//!
//! Every change clamps the viewport to the content, re-pins the header
//! strips and requests a virtualization pass towards the new visible range.
//! The pass completes on the next `tick`, which also moves pinned headers.

use super::pool::{CellFactory, CellPool};
use super::GridView;
use crate::grid::RowData;

impl<T: RowData> GridView<T> {
    /// Set the absolute scroll position.
    pub fn scroll_to(&mut self, x: f32, y: f32, pool: &mut CellPool, factory: &mut dyn CellFactory) {
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
        self.viewport_changed(pool, factory);
    }

    /// Scroll by a delta.
    pub fn scroll_by(
        &mut self,
        delta_x: f32,
        delta_y: f32,
        pool: &mut CellPool,
        factory: &mut dyn CellFactory,
    ) {
        self.viewport.scroll_x += delta_x;
        self.viewport.scroll_y += delta_y;
        self.viewport_changed(pool, factory);
    }

    /// Resize the viewport.
    pub fn resize(&mut self, width: f32, height: f32, pool: &mut CellPool, factory: &mut dyn CellFactory) {
        self.viewport.resize(width, height);
        self.viewport_changed(pool, factory);
    }

    fn viewport_changed(&mut self, pool: &mut CellPool, factory: &mut dyn CellFactory) {
        let (rows, columns) = self.grid.positions_mut();
        self.viewport.clamp_scroll(rows, columns);
        self.grid
            .pin_headers(self.viewport.scroll_x, self.viewport.scroll_y);
        tracing::trace!(
            x = self.viewport.scroll_x,
            y = self.viewport.scroll_y,
            width = self.viewport.width,
            height = self.viewport.height,
            "viewport changed"
        );
        self.refresh(pool, factory);
    }
}
