//! Typed cell values returned by column getters.

use std::fmt;

use serde::Serialize;

/// Fixed-size float vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Vector {
    V2([f64; 2]),
    V3([f64; 3]),
    V4([f64; 4]),
}

impl Vector {
    pub fn components(&self) -> &[f64] {
        match self {
            Self::V2(v) => v,
            Self::V3(v) => v,
            Self::V4(v) => v,
        }
    }
}

/// Value produced by a column getter.
///
/// `Empty` renders as no text at all, leaving the cell's cached text unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Vector(Vector),
    Text(String),
    List(Vec<CellValue>),
}

impl CellValue {
    /// Display text, `None` for [`CellValue::Empty`].
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Vector(v) => {
                f.write_str("(")?;
                write_joined(f, v.components())?;
                f.write_str(")")
            }
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<[f64; 2]> for CellValue {
    fn from(v: [f64; 2]) -> Self {
        Self::Vector(Vector::V2(v))
    }
}

impl From<[f64; 3]> for CellValue {
    fn from(v: [f64; 3]) -> Self {
        Self::Vector(Vector::V3(v))
    }
}

impl From<[f64; 4]> for CellValue {
    fn from(v: [f64; 4]) -> Self {
        Self::Vector(Vector::V4(v))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}
