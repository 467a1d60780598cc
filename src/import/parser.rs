//! CSV reading
//!
//! Reads a bank export into rows keyed by header name. Rows may be ragged:
//! missing trailing cells read as empty, extra cells are ignored.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::SpendwiseError;

/// One data row of a CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source (the header is line 1)
    pub line: usize,
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn new(line: usize, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Value of a column, or `None` when the header is unknown
    ///
    /// When a header repeats, the first column with that name wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty value of a column
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// A parsed CSV file: headers plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

/// Parse CSV text into a header list and data rows
///
/// Blank lines (including lines of only separators) are skipped. Empty input
/// yields no headers and no rows.
pub fn read_csv(content: &str) -> Result<CsvTable, SpendwiseError> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Ok(CsvTable::default());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);

        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record.get(i).unwrap_or("").trim().to_string();
                (header.clone(), value)
            })
            .collect();

        rows.push(CsvRow::new(line, fields));
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed csv");
    Ok(CsvTable { headers, rows })
}

/// Parse CSV text into data rows keyed by header
///
/// A header plus N data rows yields exactly N rows; empty or header-only
/// input yields none.
pub fn parse_csv(content: &str) -> Result<Vec<CsvRow>, SpendwiseError> {
    Ok(read_csv(content)?.rows)
}
