//! Structured error types for gridview.
//!
//! Parser and converter failures are [`ParseError`]s carrying the offending
//! character offset and its line/column; everything the grid itself can
//! report is a [`GridError`].

use std::fmt;

use serde::Serialize;

use crate::cell_ref::Coordinate;
use crate::parser::LineIndex;

/// Which stage of value parsing rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorKind {
    /// Malformed token stream (unterminated literal, mismatched delimiter, ...).
    Syntax,
    /// Well-formed tokens that cannot become the requested type.
    Conversion,
    /// The tokenizer's loop guard tripped. Indicates a parser bug.
    Internal,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("syntax error"),
            Self::Conversion => f.write_str("conversion error"),
            Self::Internal => f.write_str("internal error"),
        }
    }
}

/// A located failure while parsing or converting cell text.
///
/// `line` and `column` are zero-based and derived from `offset`, a character
/// (not byte) offset into `text`. `Display` reports them one-based.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind}: {message} (line {}, column {})", .line + 1, .column + 1)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Snapshot of the text being parsed.
    pub text: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error at `offset` in `text`, resolving its line and column.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, text: &str, offset: usize) -> Self {
        let (line, column) = LineIndex::new(text).line_column(offset);
        Self {
            kind,
            message: message.into(),
            text: text.to_string(),
            offset,
            line,
            column,
        }
    }

    pub fn syntax(message: impl Into<String>, text: &str, offset: usize) -> Self {
        Self::new(ParseErrorKind::Syntax, message, text, offset)
    }

    pub fn conversion(message: impl Into<String>, text: &str, offset: usize) -> Self {
        Self::new(ParseErrorKind::Conversion, message, text, offset)
    }

    pub fn internal(message: impl Into<String>, text: &str, offset: usize) -> Self {
        Self::new(ParseErrorKind::Internal, message, text, offset)
    }

    /// Zero-based `(line, column)` for placing an edit caret.
    pub fn caret(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == ParseErrorKind::Syntax
    }

    pub fn is_conversion(&self) -> bool {
        self.kind == ParseErrorKind::Conversion
    }
}

/// All errors surfaced by grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Cell text was rejected by the parser or a column setter.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Coordinate outside the grid.
    #[error("Coordinate out of range: {0}")]
    OutOfRange(Coordinate),

    /// Column (or row header) has no setter.
    #[error("Cell is read-only: {0}")]
    ReadOnly(Coordinate),

    /// A widget was bound over a live binding. Logged and self-healed.
    #[error("Binding conflict: {0}")]
    Binding(String),

    /// Row data is already mutably borrowed elsewhere.
    #[error("Row {0} data is borrowed")]
    RowBorrowed(usize),

    /// Clipboard text could not be read or written as tab-separated records.
    #[error("Clipboard text: {0}")]
    Clipboard(#[from] csv::Error),

    /// Malformed configuration.
    #[error("Configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_resolves_line_and_column() {
        let err = ParseError::syntax("boom", "ab\ncd", 4);
        assert_eq!(err.caret(), (1, 1));
        assert_eq!(err.to_string(), "syntax error: boom (line 2, column 2)");
    }

    #[test]
    fn test_grid_error_wraps_parse_error() {
        let err: GridError = ParseError::conversion("nope", "x", 0).into();
        assert!(matches!(err, GridError::Parse(ref e) if e.is_conversion()));
        assert_eq!(err.to_string(), "conversion error: nope (line 1, column 1)");
    }
}
