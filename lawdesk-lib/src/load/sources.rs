use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use serde::Deserialize;
use tracing::warn;

use crate::load::Row;
use crate::{Error, Result};

/// Source file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel or OpenDocument workbook; the first worksheet is read
    Spreadsheet,
    /// Comma separated values with a header row
    Delimited,
    /// JSON object of the form `{"columns": [...], "data": [[...], ...]}`
    Records,
}

impl SourceFormat {
    /// Identify the format from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Delimited),
            "json" => Some(Self::Records),
            _ => None,
        }
    }
}

/// Parse one source file into rows keyed by trimmed header names.
pub fn read_rows(path: &Path, format: SourceFormat) -> Result<Vec<Row>> {
    match format {
        SourceFormat::Spreadsheet => read_spreadsheet(path),
        SourceFormat::Delimited => read_delimited(path),
        SourceFormat::Records => read_records(path),
    }
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Row>> {
    let name = display_name(path);
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::parse(&name, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::parse(&name, "workbook has no worksheets"))?
        .map_err(|e| Error::parse(&name, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();
    let records = rows.map(|cells| cells.iter().map(cell_text).collect());

    Ok(rows_from_table(&headers, records))
}

/// Whole-number cells read as integers (`144`, not `144.0`).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn read_delimited(path: &Path) -> Result<Vec<Row>> {
    let name = display_name(path);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::parse(&name, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::parse(&name, e))?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => records.push(record.iter().map(str::to_owned).collect()),
            // a bad line costs one row, not the whole file
            Err(err) => warn!(file = %name, error = %err, "skipping malformed record"),
        }
    }

    Ok(rows_from_table(&headers, records))
}

#[derive(Deserialize)]
struct RecordFile {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
}

fn read_records(path: &Path) -> Result<Vec<Row>> {
    let name = display_name(path);
    let raw = fs::read_to_string(path).map_err(|e| Error::parse(&name, e))?;
    let file: RecordFile = serde_json::from_str(&raw).map_err(|e| Error::parse(&name, e))?;

    let records = file
        .data
        .into_iter()
        .map(|values| values.into_iter().map(value_text).collect());

    Ok(rows_from_table(&file.columns, records))
}

fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Zip each record with the header row. Headers are trimmed, blank headers are
/// dropped, and the first column wins when a header repeats.
fn rows_from_table(headers: &[String], records: impl IntoIterator<Item = Vec<String>>) -> Vec<Row> {
    records
        .into_iter()
        .map(|values| {
            let mut row = Row::new();
            for (header, value) in headers.iter().zip(values) {
                let header = header.trim();
                if header.is_empty() {
                    continue;
                }
                row.entry(header.to_owned()).or_insert(value);
            }
            row
        })
        .collect()
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
