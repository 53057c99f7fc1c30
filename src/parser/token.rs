//! Token tree produced by the tokenizer.

use serde::Serialize;

/// A unit of parsed text. Offsets are character offsets into the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Token {
    /// Numeric literal
    Number { value: f64, offset: usize },
    /// Bare word (may be empty, for `,,`)
    Bare { text: String, offset: usize },
    /// Quoted string literal, already unescaped
    #[serde(rename = "string")]
    Str { text: String, offset: usize },
    /// Bracketed group; `offset` is the opening delimiter
    List { items: Vec<Token>, offset: usize },
}

impl Token {
    pub fn offset(&self) -> usize {
        match self {
            Self::Number { offset, .. }
            | Self::Bare { offset, .. }
            | Self::Str { offset, .. }
            | Self::List { offset, .. } => *offset,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Text of a bare or string token.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Bare { text, .. } | Self::Str { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Render a token tree for diagnostics, e.g. `[1, 3, [4, 3], "c\nat"]`.
pub fn debug_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    write_list(&mut out, tokens);
    out
}

fn write_list(out: &mut String, tokens: &[Token]) {
    out.push('[');
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match token {
            Token::Number { value, .. } => out.push_str(&value.to_string()),
            Token::Bare { text, .. } => out.push_str(text),
            Token::Str { text, .. } => out.push_str(&format!("{text:?}")),
            Token::List { items, .. } => write_list(out, items),
        }
    }
    out.push(']');
}
