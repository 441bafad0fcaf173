//! In-memory representation of parsed documents.
//!
//! Every supported input format decodes into a [`Dataset`]: spreadsheet-like
//! formats become a typed [`Table`], free-form formats become plain text.
//! Downstream consumers (the store, the analysis prompts, the report writer)
//! only ever see this representation, never the source bytes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single typed cell in a parsed table.
///
/// Variant order matters: untagged deserialization tries `Int` before
/// `Float`, so whole numbers stay integers on a round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// A float that carries no fractional part collapses back to an int.
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A parsed table: named columns plus typed rows.
///
/// Rows are always exactly `columns.len()` cells wide; [`Table::push_row`]
/// pads short rows with nulls and drops overflow cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, normalizing its width to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.truncate(self.columns.len());
        while row.len() < self.columns.len() {
            row.push(CellValue::Null);
        }
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Strict prefix of the first `n` rows (clamped to the row count).
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Indices of numeric columns.
    ///
    /// A column is numeric when every non-null cell is an int or float and
    /// at least one such cell exists.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| {
                let mut seen = false;
                for row in &self.rows {
                    match &row[i] {
                        CellValue::Null => continue,
                        CellValue::Int(_) | CellValue::Float(_) => seen = true,
                        _ => return false,
                    }
                }
                seen
            })
            .collect()
    }

    /// Per-column sums over the numeric columns, nulls skipped.
    ///
    /// Integral sums report as ints so a column of ints does not come back
    /// as `6.0`.
    pub fn column_sums(&self) -> Vec<(String, CellValue)> {
        self.numeric_columns()
            .into_iter()
            .map(|i| {
                let sum: f64 = self
                    .rows
                    .iter()
                    .filter_map(|row| row[i].as_f64())
                    .sum();
                (self.columns[i].clone(), CellValue::from_f64(sum))
            })
            .collect()
    }

    /// Distinct non-null value count for every column.
    ///
    /// Numeric cells compare on a canonical form, so `1` and `1.0` in a
    /// mixed int/float column count as one value.
    pub fn unique_counts(&self) -> Vec<(String, usize)> {
        (0..self.columns.len())
            .map(|i| {
                let distinct: HashSet<String> = self
                    .rows
                    .iter()
                    .filter(|row| !row[i].is_null())
                    .map(|row| match row[i].as_f64() {
                        Some(v) => format!("{:?}", CellValue::from_f64(v)),
                        None => format!("{:?}", row[i]),
                    })
                    .collect();
                (self.columns[i].clone(), distinct.len())
            })
            .collect()
    }

    /// Render the table as a padded markdown-style grid.
    ///
    /// Used both for analysis prompts and terminal display, so the layout
    /// stays stable: header row, dash separator, then data rows.
    pub fn render_text(&self) -> String {
        let header: Vec<String> = self.columns.clone();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        // minimum width 3 keeps the separator row visible for empty columns
        let mut col_widths = vec![3usize; header.len()];
        for (i, name) in header.iter().enumerate() {
            col_widths[i] = col_widths[i].max(name.chars().count());
        }
        for row in &body {
            for (i, cell) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }

        let mut output = String::new();
        output.push('|');
        for (i, &width) in col_widths.iter().enumerate() {
            output.push_str(&format!(" {:width$} |", header[i]));
        }
        output.push('\n');
        output.push('|');
        for &width in &col_widths {
            output.push_str(&format!(" {} |", "-".repeat(width)));
        }
        output.push('\n');
        for row in &body {
            output.push('|');
            for (i, &width) in col_widths.iter().enumerate() {
                let cell = row.get(i).map(|s| s.as_str()).unwrap_or("");
                output.push_str(&format!(" {:width$} |", cell));
            }
            output.push('\n');
        }

        output
    }
}

/// What a file decoded into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dataset {
    Table(Table),
    Text(String),
}

impl Dataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Self::Table(_) => DatasetKind::Table,
            Self::Text(_) => DatasetKind::Text,
        }
    }

    /// Text rendering used for analysis prompts.
    pub fn render_text(&self) -> String {
        match self {
            Self::Table(table) => table.render_text(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Shape discriminant for a stored dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Table,
    Text,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Text => "text",
        }
    }
}
