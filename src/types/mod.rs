//! Shared value and selection types.

mod selection;
mod value;

pub use selection::{PasteReport, SelectionModel};
pub use value::{CellValue, Vector};
