//! Clipboard access and TSV encoding for `GridView`.
//!
//! Copy writes the selection's bounding box as tab-separated text; paste
//! writes tab-separated text back through the grid's cell setters.

use super::pool::CellFactory;
use super::GridView;
use crate::cell_ref::Coordinate;
use crate::error::{GridError, Result};
use crate::grid::RowData;
use crate::types::PasteReport;

/// System clipboard seen by the grid.
pub trait Clipboard {
    fn get_text(&self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// In-process clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }
}

/// Field separator of clipboard text.
const DELIMITER: u8 = b'\t';

/// Write records as tab-separated text, one line per record.
///
/// Fields holding tabs, line breaks or quotes are quoted with inner quotes
/// doubled. The last record carries no line break.
pub fn join_records<R>(records: impl IntoIterator<Item = R>) -> Result<String>
where
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut text = String::from_utf8(bytes).map_err(|err| GridError::Other(err.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Split tab-separated text into records and fields, honouring quoted
/// fields. Records may differ in length; `\n`, `\r\n` and `\r` all end a
/// record and a trailing line break adds no record.
pub fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

impl<T: RowData> GridView<T> {
    /// Serialize the selection and put it on the clipboard.
    pub fn copy_selection(&self, clipboard: &mut dyn Clipboard) -> Result<String> {
        let text = self.selection.serialize_to_text(&self.grid)?;
        tracing::debug!(bytes = text.len(), "copying selection");
        clipboard.set_text(&text);
        Ok(text)
    }

    /// Paste clipboard text at the top-left of the selection.
    ///
    /// A selection that starts on a header axis pastes from that header, so
    /// a copy that includes labels lands back where it came from. Cells that
    /// reject their text are reported and flagged with the reason; the rest
    /// are still written.
    pub fn paste(
        &mut self,
        clipboard: &dyn Clipboard,
        factory: &mut dyn CellFactory,
    ) -> PasteReport {
        let Some(text) = clipboard.get_text() else {
            return PasteReport::default();
        };
        let anchor = self.paste_anchor();
        let report = self
            .selection
            .deserialize_and_apply(&text, anchor, &mut self.grid);
        for position in &report.applied {
            self.push_cell(*position, factory, None);
        }
        for (position, err) in &report.errors {
            tracing::debug!(%position, error = %err, "paste rejected");
            if let Some(widget) = self.grid.widget_at(*position) {
                factory.set_error(widget, Some(&err.to_string()));
            }
        }
        report
    }

    fn paste_anchor(&self) -> Coordinate {
        match self.selection.bounding_box() {
            Some(span) => Coordinate::from_indices(span.min_row, span.min_column),
            None => Coordinate::cell(0, 0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_join_records() {
        assert_eq!(join_records([["a", "b"], ["c", "d"]]).unwrap(), "a\tb\nc\td");
        assert_eq!(join_records([["plain"]]).unwrap(), "plain");
        assert_eq!(join_records([["a\tb"]]).unwrap(), "\"a\tb\"");
        assert_eq!(join_records([["say \"hi\""]]).unwrap(), "\"say \"\"hi\"\"\"");
        assert_eq!(join_records([["two\nlines"]]).unwrap(), "\"two\nlines\"");
        assert_eq!(join_records([["", "x"]]).unwrap(), "\tx");
        assert_eq!(join_records(Vec::<Vec<String>>::new()).unwrap(), "");
    }

    #[test]
    fn test_split_records() {
        assert_eq!(
            split_records("a\tb\nc\td\n").unwrap(),
            vec![vec!["a", "b"], vec!["c", "d"]]
        );
        assert_eq!(split_records("a\t\t").unwrap(), vec![vec!["a", "", ""]]);
        assert_eq!(split_records("x\r\ny").unwrap(), vec![vec!["x"], vec!["y"]]);
        assert_eq!(split_records("a\t1\t2\nb").unwrap(), vec![vec!["a", "1", "2"], vec!["b"]]);
        assert!(split_records("").unwrap().is_empty());
    }

    #[test]
    fn test_split_quoted_fields() {
        let text = join_records([vec!["a\tb", "say \"hi\"\nthere"], vec!["last"]]).unwrap();
        assert_eq!(
            split_records(&text).unwrap(),
            vec![vec!["a\tb", "say \"hi\"\nthere"], vec!["last"]]
        );
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);
        clipboard.set_text("x");
        assert_eq!(clipboard.get_text().as_deref(), Some("x"));
    }
}
