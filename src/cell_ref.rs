//! Grid coordinates, rectangular ranges, and A1-style references.
//!
//! A [`Coordinate`] is either a normal cell, a whole-row header, a
//! whole-column header, or invalid. Range arithmetic works on signed axis
//! indices in which a header axis is `-1`, so a range may span header cells
//! and normal cells at once (e.g. a row label column plus its cells).

use std::fmt;

use serde::Serialize;

/// A position in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Coordinate {
    /// A normal data cell.
    Cell { row: usize, column: usize },
    /// The header (label) cell of a row.
    RowHeader(usize),
    /// The header (label) cell of a column.
    ColumnHeader(usize),
    /// No position.
    #[default]
    Invalid,
}

impl Coordinate {
    pub const fn cell(row: usize, column: usize) -> Self {
        Self::Cell { row, column }
    }

    /// Build a coordinate from signed axis indices. A negative column means
    /// "row header", a negative row means "column header", both negative is
    /// [`Coordinate::Invalid`].
    pub fn from_indices(row: i64, column: i64) -> Self {
        match (usize::try_from(row), usize::try_from(column)) {
            (Ok(row), Ok(column)) => Self::Cell { row, column },
            (Ok(row), Err(_)) => Self::RowHeader(row),
            (Err(_), Ok(column)) => Self::ColumnHeader(column),
            (Err(_), Err(_)) => Self::Invalid,
        }
    }

    /// Signed row index; `-1` for column headers and invalid coordinates.
    pub fn row_index(&self) -> i64 {
        match *self {
            Self::Cell { row, .. } | Self::RowHeader(row) => to_axis(row),
            Self::ColumnHeader(_) | Self::Invalid => -1,
        }
    }

    /// Signed column index; `-1` for row headers and invalid coordinates.
    pub fn column_index(&self) -> i64 {
        match *self {
            Self::Cell { column, .. } | Self::ColumnHeader(column) => to_axis(column),
            Self::RowHeader(_) | Self::Invalid => -1,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Self::Cell { .. })
    }

    /// Shift by a row/column delta in axis-index space.
    pub fn offset(&self, rows: i64, columns: i64) -> Self {
        if !self.is_valid() {
            return Self::Invalid;
        }
        Self::from_indices(
            self.row_index().saturating_add(rows),
            self.column_index().saturating_add(columns),
        )
    }
}

fn to_axis(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Entries in `min..=max`, saturating at `usize::MAX`.
fn axis_len(min: i64, max: i64) -> usize {
    let len = i128::from(max) - i128::from(min) + 1;
    if len <= 0 {
        0
    } else {
        usize::try_from(len).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Cell { row, column } => write!(f, "{}{}", column_name(column), row + 1),
            Self::RowHeader(row) => write!(f, "{}", row + 1),
            Self::ColumnHeader(column) => f.write_str(&column_name(column)),
            Self::Invalid => f.write_str("#invalid"),
        }
    }
}

/// Inclusive rectangle between two coordinates, in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub start: Coordinate,
    pub end: Coordinate,
}

/// Inclusive signed bounds of a range on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min_row: i64,
    pub max_row: i64,
    pub min_column: i64,
    pub max_column: i64,
}

impl Span {
    pub fn contains(&self, row: i64, column: i64) -> bool {
        row >= self.min_row && row <= self.max_row && column >= self.min_column && column <= self.max_column
    }

    /// Smallest span covering both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_column: self.min_column.min(other.min_column),
            max_column: self.max_column.max(other.max_column),
        }
    }
}

impl Range {
    /// The empty range, used for "nothing rendered" and teardown.
    pub const INVALID: Range = Range {
        start: Coordinate::Invalid,
        end: Coordinate::Invalid,
    };

    pub const fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    pub const fn single(position: Coordinate) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Range of normal cells `(r0, c0)..=(r1, c1)`.
    pub const fn cells(r0: usize, c0: usize, r1: usize, c1: usize) -> Self {
        Self::new(Coordinate::cell(r0, c0), Coordinate::cell(r1, c1))
    }

    fn from_span(span: Span) -> Self {
        if span.min_row > span.max_row || span.min_column > span.max_column {
            return Self::INVALID;
        }
        Self {
            start: Coordinate::from_indices(span.min_row, span.min_column),
            end: Coordinate::from_indices(span.max_row, span.max_column),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }

    /// Normalized signed bounds, `None` for an invalid range.
    pub fn span(&self) -> Option<Span> {
        if !self.is_valid() {
            return None;
        }
        let (r0, r1) = (self.start.row_index(), self.end.row_index());
        let (c0, c1) = (self.start.column_index(), self.end.column_index());
        Some(Span {
            min_row: r0.min(r1),
            max_row: r0.max(r1),
            min_column: c0.min(c1),
            max_column: c0.max(c1),
        })
    }

    /// Component-wise minimum corner.
    pub fn min(&self) -> Coordinate {
        self.span()
            .map_or(Coordinate::Invalid, |s| Coordinate::from_indices(s.min_row, s.min_column))
    }

    /// Component-wise maximum corner.
    pub fn max(&self) -> Coordinate {
        self.span()
            .map_or(Coordinate::Invalid, |s| Coordinate::from_indices(s.max_row, s.max_column))
    }

    pub fn width(&self) -> usize {
        self.span()
            .map_or(0, |s| axis_len(s.min_column, s.max_column))
    }

    pub fn height(&self) -> usize {
        self.span()
            .map_or(0, |s| axis_len(s.min_row, s.max_row))
    }

    pub fn area(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    pub fn contains(&self, position: Coordinate) -> bool {
        if !position.is_valid() {
            return false;
        }
        self.span()
            .is_some_and(|s| s.contains(position.row_index(), position.column_index()))
    }

    /// Bounding range of both. An invalid operand is ignored.
    pub fn union(&self, other: &Range) -> Range {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => Self::from_span(a.merge(&b)),
            (Some(_), None) => *self,
            (None, Some(_)) => *other,
            (None, None) => Self::INVALID,
        }
    }

    /// Overlap of both, [`Range::INVALID`] when disjoint.
    pub fn intersection(&self, other: &Range) -> Range {
        let (Some(a), Some(b)) = (self.span(), other.span()) else {
            return Self::INVALID;
        };
        Self::from_span(Span {
            min_row: a.min_row.max(b.min_row),
            max_row: a.max_row.min(b.max_row),
            min_column: a.min_column.max(b.min_column),
            max_column: a.max_column.min(b.max_column),
        })
    }

    /// Every coordinate in the range, rows outer and columns inner.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> {
        let span = self.span();
        let rows = span.map_or(0..=-1, |s| s.min_row..=s.max_row);
        let columns = span.map_or(0..=-1, |s| s.min_column..=s.max_column);
        rows.flat_map(move |r| columns.clone().map(move |c| Coordinate::from_indices(r, c)))
            .filter(Coordinate::is_valid)
    }

    pub fn for_each(&self, mut action: impl FnMut(Coordinate)) {
        for position in self.iter() {
            action(position);
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Spreadsheet column name for a zero-based index: `A`..`Z`, `AA`, `AB`, ...
pub fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        let rem = u8::try_from(index % 26).unwrap_or(0);
        letters.push(char::from(b'A' + rem));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Parse a reference like `B3`, `B` (column header) or `3` (row header).
pub fn parse_coordinate(reference: &str) -> Option<Coordinate> {
    let mut column: usize = 0;
    let mut row: usize = 0;
    let mut saw_column = false;
    let mut saw_row = false;

    for ch in reference.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let upper = ch.to_ascii_uppercase();
            column = column
                .checked_mul(26)?
                .checked_add(upper as usize - 'A' as usize + 1)?;
            saw_column = true;
        } else if let Some(digit) = ch.to_digit(10) {
            row = row.checked_mul(10)?.checked_add(digit as usize)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    match (saw_column, saw_row) {
        (true, true) if row > 0 => Some(Coordinate::cell(row - 1, column - 1)),
        (true, false) => Some(Coordinate::ColumnHeader(column - 1)),
        (false, true) if row > 0 => Some(Coordinate::RowHeader(row - 1)),
        _ => None,
    }
}

/// Parse `A1:B10` or a single reference into a [`Range`].
pub fn parse_range(reference: &str) -> Option<Range> {
    if let Some((start, end)) = reference.split_once(':') {
        Some(Range::new(parse_coordinate(start)?, parse_coordinate(end)?))
    } else {
        parse_coordinate(reference).map(Range::single)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_header_families_are_distinct() {
        let set: HashSet<Coordinate> = [
            Coordinate::cell(0, 0),
            Coordinate::RowHeader(0),
            Coordinate::ColumnHeader(0),
            Coordinate::Invalid,
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 4);
        assert_eq!(Coordinate::from_indices(3, -1), Coordinate::RowHeader(3));
        assert_eq!(Coordinate::from_indices(-1, 2), Coordinate::ColumnHeader(2));
        assert_eq!(Coordinate::from_indices(-1, -1), Coordinate::Invalid);
    }

    #[test]
    fn test_range_metrics_with_reversed_corners() {
        let r = Range::cells(4, 5, 1, 2);
        assert_eq!(r.min(), Coordinate::cell(1, 2));
        assert_eq!(r.max(), Coordinate::cell(4, 5));
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 4);
        assert_eq!(r.area(), 16);
        assert!(r.contains(Coordinate::cell(4, 2)));
        assert!(!r.contains(Coordinate::cell(0, 2)));
    }

    #[test]
    fn test_range_metrics_at_axis_limits() {
        let r = Range::new(Coordinate::ColumnHeader(0), Coordinate::cell(usize::MAX, 0));
        let expected = usize::try_from(i128::from(i64::MAX) + 2).unwrap_or(usize::MAX);
        assert_eq!(r.height(), expected);
        assert_eq!(r.width(), 1);

        let wide = Range::cells(0, 0, usize::MAX, usize::MAX);
        assert_eq!(wide.area(), usize::MAX);
        assert_eq!(Range::INVALID.area(), 0);
    }

    #[test]
    fn test_range_spanning_row_headers() {
        let r = Range::new(Coordinate::RowHeader(1), Coordinate::cell(3, 2));
        assert!(r.contains(Coordinate::RowHeader(2)));
        assert!(r.contains(Coordinate::cell(2, 0)));
        assert!(!r.contains(Coordinate::ColumnHeader(0)));
        assert_eq!(r.width(), 4);
    }

    #[test]
    fn test_union_contains_either_operand() {
        let pairs = [
            (Range::cells(0, 0, 3, 3), Range::cells(2, 2, 6, 5)),
            (Range::cells(1, 1, 8, 8), Range::cells(3, 3, 4, 4)),
            (Range::cells(5, 0, 0, 2), Range::cells(0, 1, 5, 4)),
        ];
        for (a, b) in pairs {
            let u = a.union(&b);
            let bounds = u.span().unwrap();
            for r in bounds.min_row..=bounds.max_row {
                for c in bounds.min_column..=bounds.max_column {
                    let p = Coordinate::from_indices(r, c);
                    if a.contains(p) || b.contains(p) {
                        assert!(u.contains(p), "{u} should contain {p}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_intersection_and_invalid_operands() {
        let a = Range::cells(0, 0, 9, 3);
        let b = Range::cells(5, 0, 14, 3);
        assert_eq!(a.intersection(&b), Range::cells(5, 0, 9, 3));
        assert_eq!(a.intersection(&Range::cells(20, 0, 21, 0)), Range::INVALID);
        assert_eq!(a.union(&Range::INVALID), a);
        assert_eq!(Range::INVALID.union(&b), b);
        assert!(!Range::INVALID.contains(Coordinate::Invalid));
    }

    #[test]
    fn test_iteration_order() {
        let visited: Vec<_> = Range::cells(1, 1, 0, 0).iter().collect();
        assert_eq!(
            visited,
            vec![
                Coordinate::cell(0, 0),
                Coordinate::cell(0, 1),
                Coordinate::cell(1, 0),
                Coordinate::cell(1, 1),
            ]
        );
        assert_eq!(Range::INVALID.iter().count(), 0);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(parse_coordinate("B3"), Some(Coordinate::cell(2, 1)));
        assert_eq!(parse_coordinate("$AA$10"), Some(Coordinate::cell(9, 26)));
        assert_eq!(parse_coordinate("C"), Some(Coordinate::ColumnHeader(2)));
        assert_eq!(parse_coordinate("7"), Some(Coordinate::RowHeader(6)));
        assert_eq!(parse_coordinate("3B"), None);
        assert_eq!(parse_coordinate("A0"), None);
        assert_eq!(parse_range("A1:B2"), Some(Range::cells(0, 0, 1, 1)));
        assert_eq!(Coordinate::cell(2, 1).to_string(), "B3");
        assert_eq!(Range::cells(0, 0, 1, 1).to_string(), "A1:B2");
    }
}
