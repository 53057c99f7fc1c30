//! Structured value parser for cell text.
//!
//! Turns delimited text (numbers, quoted strings, nested bracket groups) into
//! a [`Token`] tree, converts tokens into floats and vectors, and locates
//! errors by line and column:
//! - [`tokenizer`]: text -> tokens, with character offsets
//! - [`convert`]: tokens / cell values -> `f64`, `[f64; N]`
//! - [`LineIndex`]: offset -> (line, column)

pub mod convert;
mod line_index;
mod token;
pub mod tokenizer;

pub use convert::{
    parse_float, parse_float_list, parse_value, parse_vector, to_float, to_vector, to_vector2,
    to_vector3, to_vector4,
};
pub use line_index::LineIndex;
pub use token::{debug_tokens, Token};
pub use tokenizer::{parse, parse_tokens, parse_tokens_with, ParseOptions, Parsed};
