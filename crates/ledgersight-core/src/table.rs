//! Raw tabular input
//!
//! The pipeline consumes a parsed table of strings; how the bytes got
//! there (upload, disk, stdin) is the caller's business. The only parser
//! the core ships is CSV, since that is what bank exports are.

use csv::ReaderBuilder;
use std::io::Read;
use tracing::debug;

use crate::error::Result;

/// A parsed table: named columns over rows of strings.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table directly from headers and rows.
    ///
    /// Short rows are allowed; missing cells read as empty.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV bytes into a table.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        debug!("Parsed CSV table: {} columns, {} rows", headers.len(), rows.len());
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name.
    ///
    /// Matching ignores case, surrounding whitespace, and a trailing `*`
    /// (some statement exports label the fee column `Fee*`).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = canonical(name);
        self.headers
            .iter()
            .position(|header| canonical(header) == wanted)
    }

    /// Cell at (row, column); empty string when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row]
            .get(column)
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn canonical(header: &str) -> String {
    header.trim().trim_end_matches('*').trim().to_lowercase()
}
