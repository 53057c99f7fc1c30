//! Cumulative offsets of rows or columns.
//!
//! One table per axis. Offsets are recomputed lazily: every mutator marks the
//! table dirty and the next query rebuilds it, so lookups stay O(log n)
//! between edits.

/// Default column width in pixels
pub const DEFAULT_COLUMN_WIDTH: f32 = 100.0;

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f32 = 30.0;

/// Sizes along one axis plus their cached start offsets.
#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    /// Size of each entry (0 for collapsed entries)
    sizes: Vec<f32>,
    /// `offsets[i]` = start of entry i; valid only when `dirty` is false
    offsets: Vec<f32>,
    /// Gap inserted after every entry
    padding: f32,
    dirty: bool,
}

/// `offsets[i] = sum(sizes[..i]) + i * padding`
pub fn compute_offsets(sizes: &[f32], padding: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut cursor = 0.0;
    for size in sizes {
        offsets.push(cursor);
        cursor += size + padding;
    }
    offsets
}

impl PositionTable {
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            ..Self::default()
        }
    }

    pub fn with_sizes(sizes: impl IntoIterator<Item = f32>, padding: f32) -> Self {
        let mut table = Self::new(padding);
        table.set_sizes(sizes);
        table
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn size(&self, index: usize) -> Option<f32> {
        self.sizes.get(index).copied()
    }

    pub fn set_sizes(&mut self, sizes: impl IntoIterator<Item = f32>) {
        self.sizes.clear();
        self.sizes.extend(sizes);
        self.dirty = true;
    }

    pub fn push(&mut self, size: f32) {
        self.sizes.push(size);
        self.dirty = true;
    }

    pub fn insert(&mut self, index: usize, size: f32) {
        self.sizes.insert(index.min(self.sizes.len()), size);
        self.dirty = true;
    }

    pub fn remove(&mut self, index: usize) -> Option<f32> {
        if index >= self.sizes.len() {
            return None;
        }
        self.dirty = true;
        Some(self.sizes.remove(index))
    }

    pub fn truncate(&mut self, len: usize) {
        if len < self.sizes.len() {
            self.sizes.truncate(len);
            self.dirty = true;
        }
    }

    /// Returns false when `index` is out of range.
    pub fn set_size(&mut self, index: usize, size: f32) -> bool {
        match self.sizes.get_mut(index) {
            Some(slot) => {
                *slot = size;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn set_padding(&mut self, padding: f32) {
        self.padding = padding;
        self.dirty = true;
    }

    /// Recompute offsets unconditionally.
    pub fn rebuild(&mut self) -> &[f32] {
        self.offsets = compute_offsets(&self.sizes, self.padding);
        self.dirty = false;
        &self.offsets
    }

    /// Fresh offsets, rebuilding only if something changed.
    pub fn offsets(&mut self) -> &[f32] {
        if self.dirty {
            self.rebuild();
        }
        &self.offsets
    }

    pub fn offset(&mut self, index: usize) -> Option<f32> {
        self.offsets().get(index).copied()
    }

    /// Distance from the first entry's start to the last entry's end.
    pub fn extent(&mut self) -> f32 {
        let last_size = self.sizes.last().copied().unwrap_or(0.0);
        self.offsets().last().map_or(0.0, |start| start + last_size)
    }

    /// Index of the greatest entry whose offset is `<= value` (binary search).
    ///
    /// `None` if `value` precedes the first entry. Among equal offsets
    /// (zero-size entries) the last one wins.
    pub fn index_for_offset(&mut self, value: f32) -> Option<usize> {
        self.offsets()
            .partition_point(|&offset| offset <= value)
            .checked_sub(1)
    }

    /// Linear-scan equivalent of [`index_for_offset`](Self::index_for_offset).
    pub fn linear_index_for_offset(&mut self, value: f32) -> Option<usize> {
        let mut found = None;
        for (i, &offset) in self.offsets().iter().enumerate() {
            if offset <= value {
                found = Some(i);
            }
        }
        found
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

    #[test]
    fn test_offsets_include_padding() {
        let mut table = PositionTable::with_sizes([10.0, 20.0, 30.0], 2.0);
        assert_eq!(table.offsets(), &[0.0, 12.0, 34.0]);
        assert_eq!(table.extent(), 64.0);
    }

    #[test]
    fn test_dirty_flag_cleared_only_by_rebuild() {
        let mut table = PositionTable::with_sizes([10.0, 10.0], 0.0);
        assert!(table.is_dirty());
        assert_eq!(table.offset(1), Some(10.0));
        assert!(!table.is_dirty());

        assert!(table.set_size(0, 25.0));
        assert!(table.is_dirty());
        assert_eq!(table.offset(1), Some(25.0));

        table.push(5.0);
        assert_eq!(table.offset(2), Some(35.0));
        table.set_padding(1.0);
        assert_eq!(table.offset(2), Some(37.0));
        assert!(!table.set_size(9, 1.0));
    }

    #[test]
    fn test_index_for_offset() {
        let mut table = PositionTable::with_sizes([20.0; 10], 0.0);
        assert_eq!(table.index_for_offset(-1.0), None);
        assert_eq!(table.index_for_offset(0.0), Some(0));
        assert_eq!(table.index_for_offset(19.9), Some(0));
        assert_eq!(table.index_for_offset(20.0), Some(1));
        assert_eq!(table.index_for_offset(50.0), Some(2));
        assert_eq!(table.index_for_offset(10_000.0), Some(9));
        assert_eq!(PositionTable::new(0.0).index_for_offset(5.0), None);
    }

    #[test]
    fn test_binary_search_matches_linear_scan() {
        let size_tables: Vec<Vec<f32>> = vec![
            vec![10.0, 0.0, 0.0, 5.0, 30.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0],
            vec![3.5; 17],
            (0..40).map(|i| (i % 4) as f32 * 7.0).collect(),
            vec![],
        ];
        for sizes in size_tables {
            for padding in [0.0, 1.5] {
                let mut table = PositionTable::with_sizes(sizes.iter().copied(), padding);
                let extent = table.extent();
                let mut probe = -2.0;
                while probe <= extent + 2.0 {
                    assert_eq!(
                        table.index_for_offset(probe),
                        table.linear_index_for_offset(probe),
                        "sizes {sizes:?} padding {padding} probe {probe}"
                    );
                    probe += 0.25;
                }
                for i in 0..table.len() {
                    let at = table.offset(i).unwrap();
                    assert_eq!(table.index_for_offset(at), table.linear_index_for_offset(at));
                }
            }
        }
    }

    #[test]
    fn test_insert_and_remove() {
        let mut table = PositionTable::with_sizes([1.0, 2.0], 0.0);
        table.insert(1, 10.0);
        assert_eq!(table.offsets(), &[0.0, 1.0, 11.0]);
        assert_eq!(table.remove(0), Some(1.0));
        assert_eq!(table.offsets(), &[0.0, 10.0]);
        assert_eq!(table.remove(5), None);
        table.truncate(1);
        assert_eq!(table.len(), 1);
    }
}
