//! CSV decoding with per-cell type inference.

use std::path::Path;

use csv::ReaderBuilder;

use super::ParseError;
use crate::models::{CellValue, Dataset, Table};

/// Decode a CSV file into a typed table.
///
/// The first record supplies column names; blank header cells fall back to
/// positional names. Ragged records are tolerated and normalized by the
/// table itself.
pub fn parse(path: &Path) -> Result<Dataset, ParseError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ParseError::decode("csv", e))?;

    let headers = reader
        .headers()
        .map_err(|e| ParseError::decode("csv", e))?
        .clone();
    if headers.is_empty() {
        return Err(ParseError::decode("csv", "file contains no columns"));
    }

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Column {}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::decode("csv", e))?;
        table.push_row(record.iter().map(infer_cell).collect());
    }

    Ok(Dataset::Table(table))
}

/// Map one raw field to its typed cell.
///
/// Empty fields and NA tokens are nulls; ints are tried before floats so
/// `42` stays an integer.
fn infer_cell(raw: &str) -> CellValue {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return CellValue::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return CellValue::Int(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    CellValue::Text(raw.to_string())
}
