//! Widget identity, the host widget factory, and the recycling pool.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::grid::{CellRect, CellTypeId};

/// Opaque handle to a host-side cell widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WidgetId(pub u64);

/// Host side of cell rendering.
///
/// The engine never draws; it tells the factory which widgets exist, where
/// they sit, and what they show.
pub trait CellFactory {
    /// Create a new widget for `cell_type`. Called only when the pool has no
    /// free widget of that type.
    fn create(&mut self, cell_type: CellTypeId) -> WidgetId;

    fn activate(&mut self, widget: WidgetId);

    fn deactivate(&mut self, widget: WidgetId);

    fn set_text(&mut self, widget: WidgetId, text: &str);

    fn set_position(&mut self, widget: WidgetId, rect: CellRect);

    fn interactable(&self, widget: WidgetId) -> bool;

    fn set_interactable(&mut self, widget: WidgetId, interactable: bool);

    fn set_selected(&mut self, _widget: WidgetId, _selected: bool) {}

    /// Show why a cell's last edit was rejected, or clear it with `None`.
    fn set_error(&mut self, _widget: WidgetId, _message: Option<&str>) {}
}

/// Free lists of inactive widgets, one per cell type.
///
/// Owned by the caller and passed by `&mut`, so several grids can share one
/// pool. A widget is only ever handed out for the cell type it was created
/// for.
#[derive(Debug, Default)]
pub struct CellPool {
    free: HashMap<CellTypeId, Vec<WidgetId>>,
    types: HashMap<WidgetId, CellTypeId>,
    idle: HashSet<WidgetId>,
}

impl CellPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A free widget of `cell_type`, created through `factory` if none is
    /// pooled.
    pub fn acquire(&mut self, cell_type: CellTypeId, factory: &mut dyn CellFactory) -> WidgetId {
        if let Some(widget) = self.pop(cell_type) {
            tracing::trace!(?widget, ?cell_type, "reusing pooled widget");
            return widget;
        }
        let widget = factory.create(cell_type);
        tracing::trace!(?widget, ?cell_type, "created widget");
        self.types.insert(widget, cell_type);
        widget
    }

    pub fn pop(&mut self, cell_type: CellTypeId) -> Option<WidgetId> {
        let widget = self.free.get_mut(&cell_type)?.pop()?;
        self.idle.remove(&widget);
        Some(widget)
    }

    /// Return `widget` to its type's free list.
    ///
    /// Returns false for widgets the pool never handed out or that are
    /// already free.
    pub fn release(&mut self, widget: WidgetId) -> bool {
        let Some(cell_type) = self.types.get(&widget).copied() else {
            tracing::warn!(?widget, "released a widget of unknown type");
            return false;
        };
        if !self.idle.insert(widget) {
            tracing::warn!(?widget, "widget released twice");
            return false;
        }
        self.free.entry(cell_type).or_default().push(widget);
        true
    }

    pub fn cell_type(&self, widget: WidgetId) -> Option<CellTypeId> {
        self.types.get(&widget).copied()
    }

    pub fn is_free(&self, widget: WidgetId) -> bool {
        self.idle.contains(&widget)
    }

    pub fn free_count(&self, cell_type: CellTypeId) -> usize {
        self.free.get(&cell_type).map_or(0, Vec::len)
    }

    /// Number of widgets ever created through this pool.
    pub fn created(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        next: u64,
    }

    impl CellFactory for Counter {
        fn create(&mut self, _cell_type: CellTypeId) -> WidgetId {
            self.next += 1;
            WidgetId(self.next)
        }
        fn activate(&mut self, _widget: WidgetId) {}
        fn deactivate(&mut self, _widget: WidgetId) {}
        fn set_text(&mut self, _widget: WidgetId, _text: &str) {}
        fn set_position(&mut self, _widget: WidgetId, _rect: CellRect) {}
        fn interactable(&self, _widget: WidgetId) -> bool {
            false
        }
        fn set_interactable(&mut self, _widget: WidgetId, _interactable: bool) {}
    }

    #[test]
    fn test_reuses_only_matching_type() {
        let mut pool = CellPool::new();
        let mut factory = Counter::default();
        let text = pool.acquire(CellTypeId::TEXT, &mut factory);
        let header = pool.acquire(CellTypeId::HEADER, &mut factory);
        assert!(pool.release(text));
        assert!(pool.release(header));

        assert_eq!(pool.acquire(CellTypeId::TEXT, &mut factory), text);
        assert_eq!(pool.acquire(CellTypeId(5), &mut factory), WidgetId(3));
        assert_eq!(pool.free_count(CellTypeId::HEADER), 1);
        assert_eq!(pool.created(), 3);
    }

    #[test]
    fn test_double_release_rejected() {
        let mut pool = CellPool::new();
        let mut factory = Counter::default();
        let widget = pool.acquire(CellTypeId::TEXT, &mut factory);
        assert!(pool.release(widget));
        assert!(!pool.release(widget));
        assert!(!pool.release(WidgetId(99)));
        assert_eq!(pool.free_count(CellTypeId::TEXT), 1);
        assert!(pool.is_free(widget));
    }
}
