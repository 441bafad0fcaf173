//! Excel decoding via calamine.
//!
//! Both legacy `.xls` and OOXML `.xlsx` go through [`open_workbook_auto`],
//! which picks the right backend from the file itself. Only the first
//! sheet is read, matching how the rest of the pipeline treats a document
//! as a single table.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::ParseError;
use crate::models::{CellValue, Dataset, Table};

pub fn parse(path: &Path) -> Result<Dataset, ParseError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ParseError::decode("excel", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::decode("excel", "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::decode("excel", e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        // an empty sheet is a legal, zero-column table
        return Ok(Dataset::Table(Table::new(Vec::new())));
    };

    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell.to_string();
            if name.is_empty() {
                format!("Column {}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }

    Ok(Dataset::Table(table))
}

/// Convert one calamine cell to our typed representation.
///
/// Excel stores most numbers as floats; integral floats collapse back to
/// ints. Error cells read as nulls rather than failing the whole sheet.
fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::from_f64(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(_) => CellValue::Null,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(s.clone())
            }
        }
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_xlsx(bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_minimal_workbook_parses_to_table() {
        let file = write_xlsx(include_bytes!("../../tests/fixtures/minimal.xlsx"));
        let dataset = parse(file.path()).unwrap();
        let Dataset::Table(table) = dataset else {
            panic!("expected table");
        };

        assert_eq!(table.columns, vec!["name", "qty"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(
            table.rows[0],
            vec![CellValue::Text("widget".to_string()), CellValue::Int(3)]
        );
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let file = write_xlsx(b"this is not a zip archive");
        let err = parse(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::Decode { format: "excel", .. }));
    }

    #[test]
    fn test_cell_value_conversion() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(cell_value(&Data::Float(7.0)), CellValue::Int(7));
        assert_eq!(cell_value(&Data::Float(7.25)), CellValue::Float(7.25));
        assert_eq!(cell_value(&Data::Bool(false)), CellValue::Bool(false));
        assert_eq!(
            cell_value(&Data::String("total".to_string())),
            CellValue::Text("total".to_string())
        );
        assert_eq!(cell_value(&Data::String(String::new())), CellValue::Null);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = parse(Path::new("/nonexistent/book.xlsx")).unwrap_err();
        assert!(matches!(err, ParseError::Decode { format: "excel", .. }));
    }
}
