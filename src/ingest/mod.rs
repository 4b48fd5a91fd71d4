//! Spreadsheet ingestion.
//!
//! Turns raw sheet bytes into scoped [`PlayerRecord`](crate::models::PlayerRecord)s:
//! 1. Read the buffer (CSV, or a workbook flattened to CSV)
//! 2. Map headers to known statistic columns
//! 3. Normalize each row, dropping malformed ones
//! 4. Attach the tournament/stage scope

pub mod assign;
pub mod columns;
pub mod normalize;
pub mod sheet;

use thiserror::Error;
use tracing::info;

use crate::models::NormalizedRow;

pub use assign::{
    assign_scope, import_batch, merge_batch, ImportContext, ImportError, ImportReport,
    StageSelection,
};
pub use columns::{ColumnMap, StatField};
pub use normalize::{normalize_row, normalize_rows};
pub use sheet::{read_sheet, RawSheet, SourceKind};

/// Failures that reject a whole sheet.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Sheet is empty")]
    EmptySheet,

    #[error("No player name column found in headers: {0:?}")]
    MissingNameColumn(Vec<String>),
}

/// Parse a sheet buffer into normalized rows, highest rating first.
pub fn parse_sheet(bytes: &[u8], kind: SourceKind) -> Result<Vec<NormalizedRow>, ParseFailure> {
    let sheet = read_sheet(bytes, kind)?;
    parse_raw_sheet(&sheet)
}

/// Normalize an already-read sheet.
pub fn parse_raw_sheet(sheet: &RawSheet) -> Result<Vec<NormalizedRow>, ParseFailure> {
    let map = ColumnMap::from_headers(&sheet.headers);
    if !map.has_name() {
        return Err(ParseFailure::MissingNameColumn(sheet.headers.clone()));
    }

    let rows = normalize_rows(&map, &sheet.rows);
    info!(
        "Parsed {} player rows from {} data rows (unmapped columns: {:?})",
        rows.len(),
        sheet.rows.len(),
        map.missing()
    );
    Ok(rows)
}
