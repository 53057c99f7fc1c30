//! Offset to line/column translation.

/// Precomputed start offsets of every line in a text.
///
/// Offsets are character offsets, matching the tokenizer.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` = character offset of the first character of line i
    line_starts: Vec<usize>,
    /// Total length in characters
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for (i, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
            len = i + 1;
        }
        Self { line_starts, len }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based `(line, column)` of a character offset (binary search).
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        (line, offset - start)
    }

    /// Character offset of a zero-based `(line, column)`, clamped to the line.
    pub fn offset(&self, line: usize, column: usize) -> usize {
        let Some(&start) = self.line_starts.get(line) else {
            return self.len;
        };
        // Last column of a line is its newline; of the final line, end of text.
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.len, |next| next - 1);
        (start + column).min(end)
    }
}
