//! Raw sheet reading.
//!
//! CSV bytes are read directly. Workbooks (xlsx, xls, ods, ...) are first
//! flattened to CSV text from their first sheet, so both kinds go through the
//! same reader.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ParseFailure;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Kind of buffer handed to the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Delimited text
    Csv,
    /// Binary tabular workbook
    Workbook,
}

impl SourceKind {
    /// Guess the kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(SourceKind::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceKind::Workbook),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Csv => write!(f, "csv"),
            SourceKind::Workbook => write!(f, "workbook"),
        }
    }
}

/// A sheet split into its header row and data rows.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read a buffer of the given kind into a [`RawSheet`].
pub fn read_sheet(bytes: &[u8], kind: SourceKind) -> Result<RawSheet, ParseFailure> {
    match kind {
        SourceKind::Csv => read_csv(bytes),
        SourceKind::Workbook => {
            let csv = workbook_to_csv(bytes)?;
            read_csv(&csv)
        }
    }
}

/// Read delimited text. The first non-blank record is the header row.
pub fn read_csv(bytes: &[u8]) -> Result<RawSheet, ParseFailure> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let cells: Vec<String> = record
            .iter()
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    let mut records = records.into_iter();
    let headers = records.next().ok_or(ParseFailure::EmptySheet)?;
    let rows: Vec<Vec<String>> = records.collect();

    debug!("Read sheet with {} columns, {} rows", headers.len(), rows.len());
    Ok(RawSheet { headers, rows })
}

/// Flatten the first sheet of a workbook to CSV bytes.
pub fn workbook_to_csv(bytes: &[u8]) -> Result<Vec<u8>, ParseFailure> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseFailure::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseFailure::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseFailure::Workbook(e.to_string()))?;

    debug!(
        "Converting sheet '{}' ({} x {}) to csv",
        sheet_name,
        range.height(),
        range.width()
    );

    rows_to_csv(range.rows())
}

/// Write workbook rows as CSV text, one record per row.
fn rows_to_csv<'a, I>(rows: I) -> Result<Vec<u8>, ParseFailure>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row.iter().map(cell_text))?;
    }

    writer
        .into_inner()
        .map_err(|e| ParseFailure::Workbook(e.to_string()))
}

/// Text form of one cell. Whole floats print without a fraction (`20.0` -> `20`).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}
