//! Read an uploaded CSV or workbook into a [`RawDataset`]
//!
//! Only the first sheet of a workbook is read. The first row is the header.
//! Empty CSV lines and workbook rows where every cell is blank are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use crate::discount::types::{Cell, RawDataset, format_number};
use crate::error::ParseError;

/// File formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Pick a format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(ParseError::UnsupportedFormat(ext)),
        }
    }
}

/// Read an upload, choosing the parser from the extension
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<RawDataset, ParseError> {
    let path = path.as_ref();
    let dataset = match SourceFormat::from_path(path)? {
        SourceFormat::Csv => {
            let file = File::open(path).map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file)?
        }
        SourceFormat::Workbook => read_workbook(path)?,
    };

    debug!(
        "Read {} rows and {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV content; every field is kept as text
pub fn read_csv<R: Read>(reader: R) -> Result<RawDataset, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(clean_header)
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(ParseError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        // Lines of bare delimiters are kept; they are rows with null cells
        let cells: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        // Short rows are padded with nulls, long rows have nowhere to go
        if cells.len() > columns.len() {
            return Err(ParseError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: columns.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }

    Ok(RawDataset::from_rows(columns, rows))
}

/// Parse the first sheet of an xlsx/xlsm/xls/ods workbook
pub fn read_workbook(path: &Path) -> Result<RawDataset, ParseError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ParseError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .ok_or(ParseError::NoHeader)?
        .iter()
        .map(header_cell)
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(ParseError::NoHeader);
    }

    let data_rows = rows
        .map(|r| r.iter().map(Cell::from_excel).collect::<Vec<_>>())
        .filter(|cells| !is_blank_row(cells));

    Ok(RawDataset::from_rows(columns, data_rows))
}

fn clean_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn header_cell(cell: &Data) -> String {
    match cell {
        Data::String(s) => clean_header(s),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        _ => String::new(),
    }
}

fn is_blank_row(cells: &[Cell]) -> bool {
    cells.iter().all(Cell::is_blank)
}
