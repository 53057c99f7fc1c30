//! Layout engine for row/column positions and viewport management.
//!
//! This module handles:
//! - Cumulative offsets from row heights and column widths
//! - Binary search for the entry at a given offset
//! - Viewport state (scroll position, visible range)

mod position_table;
mod viewport;

pub use position_table::{compute_offsets, PositionTable, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use viewport::Viewport;
