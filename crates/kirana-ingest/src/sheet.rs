//! Sheet Loader: uploaded file -> ordered raw rows keyed by the header row.
//!
//! Workbooks (`xlsx`, `xlsm`, `xls`, `xlsb`, `ods`) are read with calamine,
//! first sheet by position. CSV is read with the `csv` crate. Headers are not
//! validated against any schema; the field extractor handles that.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::IngestError;
use crate::row::{CellValue, RawRow};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// File extensions the loader accepts, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv"];

/// Loads every data row of the first sheet in `path`.
///
/// Fully blank data rows are kept so the batch processor can count them.
///
/// # Errors
///
/// Returns [`IngestError::UnreadableFile`] if the file cannot be parsed as a
/// spreadsheet or has an unsupported extension, and [`IngestError::EmptyFile`]
/// if it parses but holds no data rows.
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let rows = if extension == "csv" {
        load_csv(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        load_workbook(path)?
    } else {
        return Err(IngestError::unreadable(format!(
            "unsupported file extension {extension:?}"
        )));
    };

    if rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    Ok(rows)
}

fn load_workbook(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(IngestError::unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyFile)?
        .map_err(IngestError::unreadable)?;

    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells
        .iter()
        .map(|cell| match cell_value(cell) {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        })
        .collect();

    Ok(rows
        .map(|cells| build_row(&headers, cells.iter().map(cell_value)))
        .collect())
}

fn load_csv(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(IngestError::unreadable)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(IngestError::unreadable)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(IngestError::unreadable)?;
        let values = record.iter().map(|field| {
            if field.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(field.to_string())
            }
        });
        rows.push(build_row(&headers, values));
    }
    Ok(rows)
}

/// Pairs cells with headers, dropping columns whose header is blank.
fn build_row(headers: &[String], values: impl Iterator<Item = CellValue>) -> RawRow {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Date cells render as `YYYY-MM-DD`; calamine applies the workbook's
        // 1900 or 1904 date system.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => {
                CellValue::Text(datetime.format("%Y-%m-%d").to_string())
            }
            _ => CellValue::Number(dt.as_f64()),
        },
    }
}
