//! Column definitions: label, width, cell type and value accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::CellValue;

/// Kind of widget a cell is rendered with. Widgets are only recycled between
/// cells of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellTypeId(pub u32);

impl CellTypeId {
    /// Plain text cell.
    pub const TEXT: CellTypeId = CellTypeId(0);
    /// Row and column header cells.
    pub const HEADER: CellTypeId = CellTypeId(u32::MAX);
}

/// Reads a cell value from row data.
pub type Getter<T> = Box<dyn Fn(&T) -> CellValue>;

/// Writes user text into row data, rejecting text it cannot parse.
pub type Setter<T> = Box<dyn Fn(&mut T, &str) -> Result<(), ParseError>>;

/// One column of the grid.
pub struct Column<T> {
    pub label: String,
    /// Requested width; `None` uses the configured default.
    pub width: Option<f32>,
    pub cell_type: CellTypeId,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> Column<T> {
    /// Read-only column.
    pub fn new(label: impl Into<String>, getter: impl Fn(&T) -> CellValue + 'static) -> Self {
        Self {
            label: label.into(),
            width: None,
            cell_type: CellTypeId::TEXT,
            getter: Box::new(getter),
            setter: None,
        }
    }

    #[must_use]
    pub fn with_setter(
        mut self,
        setter: impl Fn(&mut T, &str) -> Result<(), ParseError> + 'static,
    ) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.cell_type = cell_type;
        self
    }

    pub fn get(&self, data: &T) -> CellValue {
        (self.getter)(data)
    }

    /// Apply `text` through the setter. Returns `None` for read-only columns.
    pub fn set(&self, data: &mut T, text: &str) -> Option<Result<(), ParseError>> {
        self.setter.as_ref().map(|setter| setter(data, text))
    }

    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("width", &self.width)
            .field("cell_type", &self.cell_type)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
