//! Recursive tokenizer for delimited cell text.
//!
//! Grammar, informally:
//! - whitespace separates tokens; commas separate too, and a comma directly
//!   after another comma yields an empty bare token
//! - `[+-]? digits ('.' digits)?` is a number; a second `.` is an error
//! - any other run of non-delimiter characters is a bare token (a numeric run
//!   turns into one as soon as such a character shows up, e.g. `12px`)
//! - `'...'` and `"..."` are string literals with C-style escapes
//! - `[...]`, `(...)` and `{...}` nest; each group becomes one list token
//!
//! Nesting recurses once per bracket, so stack depth grows with input
//! nesting depth.

use serde::{Deserialize, Serialize};

use super::token::Token;
use crate::error::ParseError;

/// Default ceiling for the tokenizer's loop guard.
pub const DEFAULT_LOOP_GUARD: usize = 1000;

/// Tokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Iterations without progress tolerated before aborting with an
    /// internal error.
    pub loop_guard: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            loop_guard: DEFAULT_LOOP_GUARD,
        }
    }
}

/// Result of [`parse`]: whatever was tokenized, plus the error that stopped it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub tokens: Vec<Token>,
    pub error: Option<ParseError>,
    /// Offset just past the last consumed character.
    pub end: usize,
}

impl Parsed {
    pub fn into_result(self) -> Result<Vec<Token>, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.tokens),
        }
    }
}

/// Tokenize `text` from character offset `start`.
///
/// With a `stop` predicate, tokenizing ends right after the first top-level
/// character it accepts; otherwise it runs to the end of the text.
pub fn parse(
    text: &str,
    start: usize,
    stop: Option<&dyn Fn(char) -> bool>,
    options: &ParseOptions,
) -> Parsed {
    let mut tokenizer = Tokenizer::new(text, options.loop_guard);
    tokenizer.pos = start;
    let mut tokens = Vec::new();
    let stop = stop.map_or(Stop::EndOfText, Stop::When);
    let error = tokenizer.parse_level(stop, &mut tokens).err();
    Parsed {
        tokens,
        error,
        end: tokenizer.pos,
    }
}

/// Tokenize all of `text` with default options.
pub fn parse_tokens(text: &str) -> Result<Vec<Token>, ParseError> {
    parse_tokens_with(text, &ParseOptions::default())
}

pub fn parse_tokens_with(text: &str, options: &ParseOptions) -> Result<Vec<Token>, ParseError> {
    parse(text, 0, None, options).into_result()
}

#[derive(Clone, Copy)]
enum Stop<'p> {
    EndOfText,
    Close { open: char, close: char, open_offset: usize },
    When(&'p dyn Fn(char) -> bool),
}

/// A token being accumulated.
#[derive(Debug, Clone, Copy)]
struct Pending {
    start: usize,
    numeric: bool,
    seen_decimal: bool,
}

/// Counts consecutive iterations that did not advance the cursor.
#[derive(Debug)]
struct LoopGuard {
    limit: usize,
    stalled: usize,
    last: Option<usize>,
}

impl LoopGuard {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            stalled: 0,
            last: None,
        }
    }

    /// `false` once the cursor has sat at `pos` for more than `limit` ticks.
    fn tick(&mut self, pos: usize) -> bool {
        if self.last == Some(pos) {
            self.stalled += 1;
            self.stalled <= self.limit
        } else {
            self.last = Some(pos);
            self.stalled = 0;
            true
        }
    }
}

struct Tokenizer<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
    loop_guard: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str, loop_guard: usize) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
            loop_guard,
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn parse_level(&mut self, stop: Stop<'_>, out: &mut Vec<Token>) -> Result<(), ParseError> {
        let mut pending: Option<Pending> = None;
        let mut after_comma = false;
        let mut guard = LoopGuard::new(self.loop_guard);

        loop {
            if !guard.tick(self.pos) {
                tracing::warn!(offset = self.pos, "tokenizer loop guard tripped");
                return Err(ParseError::internal(
                    format!("tokenizer stalled at offset {}", self.pos),
                    self.text,
                    self.pos,
                ));
            }

            let Some(c) = self.peek(0) else {
                self.finish_token(&mut pending, out);
                return match stop {
                    Stop::Close {
                        open,
                        close,
                        open_offset,
                    } => Err(ParseError::syntax(
                        format!("unterminated '{open}', expected '{close}'"),
                        self.text,
                        open_offset,
                    )),
                    Stop::EndOfText | Stop::When(_) => Ok(()),
                };
            };

            if let Stop::When(accept) = stop {
                if accept(c) {
                    self.finish_token(&mut pending, out);
                    self.pos += 1;
                    return Ok(());
                }
            }

            match c {
                c if is_whitespace(c) => {
                    self.finish_token(&mut pending, out);
                    self.pos += 1;
                }
                ',' => {
                    let emitted = self.finish_token(&mut pending, out);
                    if !emitted && after_comma {
                        out.push(Token::Bare {
                            text: String::new(),
                            offset: self.pos,
                        });
                    }
                    after_comma = true;
                    self.pos += 1;
                }
                '\'' | '"' => {
                    self.finish_token(&mut pending, out);
                    after_comma = false;
                    let literal = self.string_literal(c)?;
                    out.push(literal);
                }
                '[' | '(' | '{' => {
                    self.finish_token(&mut pending, out);
                    after_comma = false;
                    let open_offset = self.pos;
                    self.pos += 1;
                    let mut items = Vec::new();
                    self.parse_level(
                        Stop::Close {
                            open: c,
                            close: closing_delimiter(c),
                            open_offset,
                        },
                        &mut items,
                    )?;
                    out.push(Token::List {
                        items,
                        offset: open_offset,
                    });
                }
                ']' | ')' | '}' => {
                    return match stop {
                        Stop::Close { close, .. } if close == c => {
                            self.finish_token(&mut pending, out);
                            self.pos += 1;
                            Ok(())
                        }
                        Stop::Close { close, .. } => Err(ParseError::syntax(
                            format!("mismatched delimiter: expected '{close}' but found '{c}'"),
                            self.text,
                            self.pos,
                        )),
                        Stop::EndOfText | Stop::When(_) => Err(ParseError::syntax(
                            format!("unexpected closing '{c}'"),
                            self.text,
                            self.pos,
                        )),
                    };
                }
                _ => {
                    after_comma = false;
                    self.token_char(c, &mut pending)?;
                    self.pos += 1;
                }
            }
        }
    }

    /// Feed one non-delimiter character into the open token.
    fn token_char(&self, c: char, pending: &mut Option<Pending>) -> Result<(), ParseError> {
        match pending {
            None => {
                let numeric = c.is_ascii_digit()
                    || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit()))
                    || (is_sign(c) && self.starts_number_after_sign());
                *pending = Some(Pending {
                    start: self.pos,
                    numeric,
                    seen_decimal: c == '.',
                });
            }
            Some(token) if token.numeric => {
                if c == '.' {
                    if token.seen_decimal {
                        return Err(ParseError::syntax(
                            "floating point with multiple decimals",
                            self.text,
                            self.pos,
                        ));
                    }
                    token.seen_decimal = true;
                } else if !c.is_ascii_digit() {
                    token.numeric = false;
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn starts_number_after_sign(&self) -> bool {
        match self.peek(1) {
            Some(d) if d.is_ascii_digit() => true,
            Some('.') => self.peek(2).is_some_and(|d| d.is_ascii_digit()),
            _ => false,
        }
    }

    /// Close the open token, if any. Returns whether a token was emitted.
    fn finish_token(&self, pending: &mut Option<Pending>, out: &mut Vec<Token>) -> bool {
        let Some(token) = pending.take() else {
            return false;
        };
        let text: String = self
            .chars
            .get(token.start..self.pos)
            .unwrap_or_default()
            .iter()
            .collect();
        let parsed = if token.numeric {
            text.parse::<f64>().ok()
        } else {
            None
        };
        out.push(match parsed {
            Some(value) => Token::Number {
                value,
                offset: token.start,
            },
            None => Token::Bare {
                text,
                offset: token.start,
            },
        });
        true
    }

    fn string_literal(&mut self, quote: char) -> Result<Token, ParseError> {
        let open_offset = self.pos;
        let source = self.text;
        let unterminated = || ParseError::syntax("unterminated string literal", source, open_offset);
        self.pos += 1;
        let mut text = String::new();
        loop {
            let c = self.peek(0).ok_or_else(unterminated)?;
            if c == quote {
                self.pos += 1;
                return Ok(Token::Str {
                    text,
                    offset: open_offset,
                });
            }
            if c != '\\' {
                text.push(c);
                self.pos += 1;
                continue;
            }
            let escape_offset = self.pos;
            self.pos += 1;
            let e = self.peek(0).ok_or_else(unterminated)?;
            self.pos += 1;
            let decoded = match e {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                'a' => '\u{07}',
                'b' => '\u{08}',
                'f' => '\u{0C}',
                'v' => '\u{0B}',
                '0'..='7' => self.octal_escape(e),
                'u' => self.unicode_escape(escape_offset)?,
                other => other,
            };
            text.push(decoded);
        }
    }

    /// `\NNN`: up to three octal digits, the first already consumed.
    fn octal_escape(&mut self, first: char) -> char {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek(0).and_then(|d| d.to_digit(8)) {
                Some(d) => {
                    value = value * 8 + d;
                    self.pos += 1;
                }
                None => break,
            }
        }
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// `\uXXXX`: exactly four hex digits.
    fn unicode_escape(&mut self, escape_offset: usize) -> Result<char, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self.peek(0).and_then(|d| d.to_digit(16)).ok_or_else(|| {
                ParseError::syntax(
                    "invalid unicode escape, expected \\uXXXX",
                    self.text,
                    escape_offset,
                )
            })?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value).ok_or_else(|| {
            ParseError::syntax(
                format!("invalid unicode scalar \\u{value:04X}"),
                self.text,
                escape_offset,
            )
        })
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{08}')
}

fn is_sign(c: char) -> bool {
    c == '-' || c == '+'
}

fn closing_delimiter(open: char) -> char {
    match open {
        '[' => ']',
        '(' => ')',
        _ => '}',
    }
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
    use crate::parser::debug_tokens;

    fn numbers(tokens: &[Token]) -> Vec<f64> {
        tokens.iter().filter_map(Token::as_number).collect()
    }

    #[test]
    fn test_mixed_list() {
        let text = "1, 3, 5 [4, 3, 1, 5]  1, \"c\\nat\", 1.2, 3";
        let tokens = parse_tokens(text).unwrap();
        assert_eq!(tokens.len(), 8);
        assert_eq!(numbers(&tokens), vec![1.0, 3.0, 5.0, 1.0, 1.2, 3.0]);
        let Token::List { items, offset } = &tokens[3] else {
            panic!("expected list, got {:?}", tokens[3]);
        };
        assert_eq!(*offset, 8);
        assert_eq!(numbers(items), vec![4.0, 3.0, 1.0, 5.0]);
        assert_eq!(tokens[5].as_text(), Some("c\nat"));
        assert_eq!(
            debug_tokens(&tokens),
            r#"[1, 3, 5, [4, 3, 1, 5], 1, "c\nat", 1.2, 3]"#
        );
    }

    #[test]
    fn test_offsets_are_monotonic() {
        fn walk(tokens: &[Token], last: &mut usize) {
            for token in tokens {
                assert!(token.offset() >= *last);
                *last = token.offset();
                if let Token::List { items, .. } = token {
                    walk(items, last);
                }
            }
        }
        let tokens = parse_tokens("a (b [c, 'd'] e) ,, -1.5 {x}").unwrap();
        walk(&tokens, &mut 0);
    }

    #[test]
    fn test_adjacent_commas_make_empty_tokens() {
        let tokens = parse_tokens("1,,2, ,3").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1], Token::Bare { text: String::new(), offset: 2 });
        assert_eq!(tokens[3], Token::Bare { text: String::new(), offset: 6 });
    }

    #[test]
    fn test_signs_and_decimals() {
        let tokens = parse_tokens("-1 +2.5 .5 -.25 - x").unwrap();
        assert_eq!(numbers(&tokens), vec![-1.0, 2.5, 0.5, -0.25]);
        assert_eq!(tokens[4].as_text(), Some("-"));
    }

    #[test]
    fn test_letters_flip_numbers_to_bare() {
        let tokens = parse_tokens("12px 3d abc").unwrap();
        let texts: Vec<_> = tokens.iter().filter_map(Token::as_text).collect();
        assert_eq!(texts, vec!["12px", "3d", "abc"]);
    }

    #[test]
    fn test_multiple_decimals_is_fatal() {
        let err = parse_tokens("1, 2.3.4").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.offset, 6);
        assert!(err.message.contains("multiple decimals"));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = parse_tokens(r#"'it\'s' "tab\tend" "\101é" "\q""#).unwrap();
        let texts: Vec<_> = tokens.iter().filter_map(Token::as_text).collect();
        assert_eq!(texts, vec!["it's", "tab\tend", "Aé", "q"]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_tokens("1, \"abc").unwrap_err();
        assert_eq!(err.offset, 3);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_bad_unicode_escape() {
        let err = parse_tokens(r#""\u12g4""#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_unterminated_bracket_points_at_opener() {
        let err = parse_tokens("(1,2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.offset, 0);
        assert_eq!(err.caret(), (0, 0));
    }

    #[test]
    fn test_mismatched_delimiter() {
        let err = parse_tokens("[1, (2]").unwrap_err();
        assert_eq!(err.offset, 6);
        assert!(err.message.contains("expected ')' but found ']'"));
    }

    #[test]
    fn test_unexpected_closer() {
        let err = parse_tokens("1 2)").unwrap_err();
        assert_eq!(err.offset, 3);
        assert!(err.message.contains("unexpected closing ')'"));
    }

    #[test]
    fn test_error_keeps_partial_tokens() {
        let parsed = parse("1 2 ]", 0, None, &ParseOptions::default());
        assert_eq!(parsed.tokens.len(), 2);
        assert!(parsed.error.is_some());
    }

    #[test]
    fn test_stop_predicate_ends_at_top_level() {
        let text = "1 (2; 3); rest";
        let stop = |c: char| c == ';';
        let parsed = parse(text, 0, Some(&stop), &ParseOptions::default());
        assert!(parsed.error.is_none());
        assert_eq!(parsed.end, 9);
        assert_eq!(parsed.tokens.len(), 2);
        let rest = parse(text, parsed.end, None, &ParseOptions::default());
        assert_eq!(rest.tokens[0].as_text(), Some("rest"));
    }

    #[test]
    fn test_error_line_and_column_on_multiline_input() {
        let err = parse_tokens("1, 2\n3, [4\n5").unwrap_err();
        assert_eq!(err.offset, 8);
        assert_eq!(err.caret(), (1, 3));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 64;
        let text = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let mut tokens = parse_tokens(&text).unwrap();
        for _ in 0..depth {
            let Some(Token::List { items, .. }) = tokens.pop() else {
                panic!("expected nested list");
            };
            tokens = items;
        }
        assert_eq!(numbers(&tokens), vec![1.0]);
    }

    #[test]
    fn test_loop_guard_trips_when_stalled() {
        let mut guard = LoopGuard::new(3);
        assert!(guard.tick(0));
        for _ in 0..3 {
            assert!(guard.tick(0));
        }
        assert!(!guard.tick(0));
        assert!(guard.tick(1));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.loop_guard, DEFAULT_LOOP_GUARD);
    }
}
