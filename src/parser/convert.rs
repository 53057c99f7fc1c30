//! Conversion of tokens and cell values into floats and vectors.
//!
//! Short vector literals are zero-filled: `"1,2"` read as a 3-vector is
//! `(1, 2, 0)`. Extra trailing components are ignored.

use super::token::Token;
use super::tokenizer::{parse_tokens_with, ParseOptions};
use crate::error::ParseError;
use crate::types::CellValue;

/// Convert one token to a float. `text` is the source the token came from.
pub fn to_float(token: &Token, text: &str) -> Result<f64, ParseError> {
    match token {
        Token::Number { value, .. } => Ok(*value),
        Token::Bare { text: word, offset } | Token::Str { text: word, offset } => word
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::conversion(format!("could not convert '{word}' to float"), text, *offset)),
        Token::List { offset, .. } => Err(ParseError::conversion(
            "cannot convert list to float",
            text,
            *offset,
        )),
    }
}

/// Parse a delimited list of floats such as `1, 2.5, 3` or `(1 2 3)`.
///
/// A single enclosing bracket group is unwrapped. The first entry that is
/// not a float aborts the conversion.
pub fn parse_float_list(text: &str) -> Result<Vec<f64>, ParseError> {
    parse_float_list_with(text, &ParseOptions::default())
}

pub fn parse_float_list_with(text: &str, options: &ParseOptions) -> Result<Vec<f64>, ParseError> {
    let tokens = parse_tokens_with(text, options)?;
    let items = match tokens.as_slice() {
        [Token::List { items, .. }] => items.as_slice(),
        all => all,
    };
    items.iter().map(|token| to_float(token, text)).collect()
}

/// Parse text holding exactly one number.
pub fn parse_float(text: &str) -> Result<f64, ParseError> {
    let tokens = parse_tokens_with(text, &ParseOptions::default())?;
    match tokens.as_slice() {
        [single] => to_float(single, text),
        [] => Err(ParseError::conversion("expected a number", text, 0)),
        [_, second, ..] => Err(ParseError::conversion(
            format!("expected a single number, found {} values", tokens.len()),
            text,
            second.offset(),
        )),
    }
}

/// Parse text into an `N`-component vector.
pub fn parse_vector<const N: usize>(text: &str) -> Result<[f64; N], ParseError> {
    let components = parse_float_list(text)?;
    fill_vector(&components, text)
}

/// Convert a cell value into an `N`-component vector.
///
/// A native vector of the same arity passes through unchanged; text is parsed
/// with [`parse_vector`]; numbers, shorter vectors and numeric lists are
/// zero-filled.
pub fn to_vector<const N: usize>(value: &CellValue) -> Result<[f64; N], ParseError> {
    let components: Vec<f64> = match value {
        CellValue::Vector(v) => v.components().to_vec(),
        CellValue::Number(n) => vec![*n],
        CellValue::Text(text) => return parse_vector(text),
        CellValue::List(items) => items.iter().map(list_item_to_float).collect::<Result<_, _>>()?,
        CellValue::Empty => {
            return Err(ParseError::conversion(
                "cannot convert empty value to vector",
                "",
                0,
            ))
        }
    };
    fill_vector(&components, "")
}

pub fn to_vector2(value: &CellValue) -> Result<[f64; 2], ParseError> {
    to_vector(value)
}

pub fn to_vector3(value: &CellValue) -> Result<[f64; 3], ParseError> {
    to_vector(value)
}

pub fn to_vector4(value: &CellValue) -> Result<[f64; 4], ParseError> {
    to_vector(value)
}

/// Best-effort typed value of free text.
///
/// A single number becomes [`CellValue::Number`], two to four numbers (bare or
/// inside one bracket group) become a [`CellValue::Vector`]. Anything else,
/// including text the tokenizer rejects, stays [`CellValue::Text`]. Blank text
/// is [`CellValue::Empty`].
pub fn parse_value(text: &str) -> CellValue {
    if text.trim().is_empty() {
        return CellValue::Empty;
    }
    let Ok(tokens) = parse_tokens_with(text, &ParseOptions::default()) else {
        return CellValue::Text(text.to_string());
    };
    let items = match tokens.as_slice() {
        [Token::List { items, .. }] => items.as_slice(),
        all => all,
    };
    let numbers: Option<Vec<f64>> = items.iter().map(Token::as_number).collect();
    match numbers.as_deref() {
        Some([n]) if tokens.len() == 1 && !tokens.iter().any(Token::is_list) => CellValue::Number(*n),
        Some(&[x, y]) => [x, y].into(),
        Some(&[x, y, z]) => [x, y, z].into(),
        Some(&[x, y, z, w]) => [x, y, z, w].into(),
        _ => CellValue::Text(text.to_string()),
    }
}

fn list_item_to_float(item: &CellValue) -> Result<f64, ParseError> {
    match item {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::conversion(format!("could not convert '{s}' to float"), s, 0)),
        other => Err(ParseError::conversion(
            format!("cannot convert '{other}' to float"),
            "",
            0,
        )),
    }
}

fn fill_vector<const N: usize>(components: &[f64], text: &str) -> Result<[f64; N], ParseError> {
    if components.is_empty() {
        return Err(ParseError::conversion(
            format!("expected {N} components, found none"),
            text,
            0,
        ));
    }
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(components) {
        *slot = *value;
    }
    Ok(out)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use test_case::test_case;

    #[test_case("(1,2,3)" => [1.0, 2.0, 3.0]; "parenthesized")]
    #[test_case("1,2" => [1.0, 2.0, 0.0]; "zero fill")]
    #[test_case("[4 5 6 7]" => [4.0, 5.0, 6.0]; "extra ignored")]
    #[test_case("{-1.5, '2', \"3\"}" => [-1.5, 2.0, 3.0]; "quoted numbers")]
    #[test_case("1e3, 0, 0" => [1000.0, 0.0, 0.0]; "exponent bare token")]
    fn test_parse_vector3(text: &str) -> [f64; 3] {
        parse_vector::<3>(text).unwrap()
    }

    #[test]
    fn test_non_numeric_entry_reports_location() {
        let err = parse_float_list("1, 2,\n  cat, 4").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Conversion);
        assert_eq!(err.message, "could not convert 'cat' to float");
        assert_eq!(err.offset, 8);
        assert_eq!(err.caret(), (1, 2));
    }

    #[test]
    fn test_nested_list_is_not_a_float() {
        let err = parse_float_list("1, [2, 3]").unwrap_err();
        assert_eq!(err.message, "cannot convert list to float");
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_syntax_error_passes_through() {
        let err = parse_vector::<3>("(1,2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn test_empty_text_has_no_components() {
        let err = parse_vector::<2>("  ").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Conversion);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(to_vector3(&[1.0, 2.0, 3.0].into()).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(to_vector4(&[1.0, 2.0].into()).unwrap(), [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(to_vector2(&CellValue::Number(7.0)).unwrap(), [7.0, 0.0]);
        assert_eq!(to_vector3(&"(4, 5)".into()).unwrap(), [4.0, 5.0, 0.0]);
        assert_eq!(
            to_vector2(&CellValue::List(vec![1.0.into(), "2".into()])).unwrap(),
            [1.0, 2.0]
        );
        assert!(to_vector2(&CellValue::Empty).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("  "), CellValue::Empty);
        assert_eq!(parse_value("2.5"), CellValue::Number(2.5));
        assert_eq!(parse_value("(1, 2)"), CellValue::from([1.0, 2.0]));
        assert_eq!(parse_value("1 2 3"), CellValue::from([1.0, 2.0, 3.0]));
        assert_eq!(parse_value("[7]"), CellValue::Text("[7]".into()));
        assert_eq!(parse_value("hello"), CellValue::Text("hello".into()));
        assert_eq!(parse_value("(1,2"), CellValue::Text("(1,2".into()));
        assert_eq!(parse_value("1,2,3,4,5"), CellValue::Text("1,2,3,4,5".into()));
    }

    #[test]
    fn test_single_float() {
        assert_eq!(parse_float(" 3.25 ").unwrap(), 3.25);
        assert!(parse_float("").is_err());
        let err = parse_float("1 2").unwrap_err();
        assert_eq!(err.offset, 2);
        let err = parse_float("abc").unwrap_err();
        assert_eq!(err.message, "could not convert 'abc' to float");
    }
}
