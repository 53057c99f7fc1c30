//! gridview - virtualized data grid with a structured cell-value parser
//!
//! Presents a collection of row objects as a scrollable grid:
//! - Row/column position tables with binary-search hit testing
//! - Only visible cells own a widget; widgets are pooled and recycled
//! - Multi-range selection with TSV copy and best-effort paste
//! - Cell text parsed into numbers and vectors, errors located by line/column
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { parse_tokens_json, parse_vector3 } from 'gridview';
//! await init();
//! const tokens = JSON.parse(parse_tokens_json('1, 3, [4, 5]'));
//! const [x, y, z] = parse_vector3('(1, 2)');
//! ```

pub mod cell_ref;
pub mod config;
pub mod editor;
pub mod error;
pub mod grid;
pub mod layout;
pub mod parser;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use cell_ref::{Coordinate, Range};
pub use config::GridConfig;
pub use editor::{CellEditor, EditRejection};
pub use error::{GridError, ParseError, ParseErrorKind, Result};
pub use grid::{CellTypeId, Column, GridModel, RowData};
pub use viewer::{CellFactory, CellPool, Clipboard, GridView, MemoryClipboard, WidgetId};

pub use types::*;

/// Tokenize cell text and return the token tree as a JSON string
///
/// # Errors
/// Returns the parse error message (with one-based line and column) if the
/// text is malformed.
#[wasm_bindgen]
pub fn parse_tokens_json(text: &str) -> std::result::Result<String, JsValue> {
    let tokens = parser::parse_tokens(text).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&tokens)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Tokenize cell text and return the token tree as a `JsValue`
///
/// This is more efficient than `parse_tokens_json` when the result will be
/// used directly in JavaScript.
///
/// # Errors
/// Returns the parse error message if the text is malformed.
#[wasm_bindgen]
pub fn parse_tokens_to_js(text: &str) -> std::result::Result<JsValue, JsValue> {
    let tokens = parser::parse_tokens(text).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&tokens)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Parse text into a 3-component vector; missing components are zero
///
/// # Errors
/// Returns the parse or conversion error message.
#[wasm_bindgen]
pub fn parse_vector3(text: &str) -> std::result::Result<Vec<f64>, JsValue> {
    parser::parse_vector::<3>(text)
        .map(|v| v.to_vec())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
