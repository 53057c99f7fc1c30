//! Grid configuration.
//!
//! All fields have defaults, so a partial JSON document such as
//! `{"show_row_headers": false}` is valid.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::parser::ParseOptions;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Size of cells whose column or row has no explicit size
    pub default_cell_size: Size,
    /// Gap after every column (`width`) and row (`height`)
    pub cell_padding: Size,
    /// Row header width and column header height
    pub header_size: Size,
    pub show_row_headers: bool,
    pub show_column_headers: bool,
    pub parse: ParseOptions,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_cell_size: Size::new(DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT),
            cell_padding: Size::new(2.0, 1.0),
            header_size: Size::new(100.0, 40.0),
            show_row_headers: true,
            show_column_headers: true,
            parse: ParseOptions::default(),
        }
    }
}

impl GridConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
