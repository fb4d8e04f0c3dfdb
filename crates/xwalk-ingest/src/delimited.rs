//! Delimited-file reading shared by the reference loaders.
//!
//! Files are read fully into memory and the handle is dropped before the
//! caller sees any rows.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

/// Cell markers wage surveys use for suppressed or unavailable estimates.
pub const SUPPRESSED_MARKERS: &[&str] = &["*", "**", "***", "#", "~", "-", "n/a", "N/A"];

/// A fully loaded delimited table.
#[derive(Debug)]
pub struct DelimitedTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl DelimitedTable {
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Index of a column the loader cannot work without.
    pub fn require(&self, name: &str, path: &Path) -> Result<usize> {
        self.optional(name).ok_or_else(|| IngestError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn optional(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Tab for `.txt`/`.tsv` (the taxonomy distribution), comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("txt" | "tsv") => b'\t',
        _ => b',',
    }
}

/// Reads a delimited file with a header row.
///
/// Tab-separated files are read without quote handling since taxonomy
/// statements contain bare double quotes.
pub fn read_delimited(path: &Path) -> Result<DelimitedTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
    let delimiter = delimiter_for(path);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .quoting(delimiter != b'\t')
        .from_reader(bytes.as_slice());

    let raw_headers = reader
        .headers()
        .map_err(|e| IngestError::parse(path, e))?
        .clone();
    let headers: StringRecord = raw_headers
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::parse(path, e))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record);
    }

    Ok(DelimitedTable { headers, rows })
}

/// Trimmed cell value, `None` when the column is absent or the cell blank.
pub fn get_string(row: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Trimmed cell value that must be present.
pub fn require_string<'r>(
    row: &'r StringRecord,
    idx: usize,
    column: &str,
    path: &Path,
) -> Result<&'r str> {
    get_string(row, Some(idx)).ok_or_else(|| IngestError::BlankValue {
        column: column.to_string(),
        line: line_of(row),
        path: path.to_path_buf(),
    })
}

/// Parses a numeric statistic. Suppression markers and non-numeric text
/// are `None`; thousands separators are accepted.
pub fn parse_measure(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() || SUPPRESSED_MARKERS.contains(&value) {
        return None;
    }
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses a required numeric cell, failing on anything non-numeric.
pub fn parse_required_f64(row: &StringRecord, idx: usize, column: &str, path: &Path) -> Result<f64> {
    let raw = require_string(row, idx, column, path)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::InvalidValue {
            column: column.to_string(),
            value: raw.to_string(),
            line: line_of(row),
            path: path.to_path_buf(),
        })
}

pub(crate) fn line_of(row: &StringRecord) -> u64 {
    row.position().map(csv::Position::line).unwrap_or(0)
}
