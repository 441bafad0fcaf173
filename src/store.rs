//! Process-wide dataset store.
//!
//! Exactly one dataset is held at a time; loading a new file replaces the
//! previous one atomically. Readers take an [`Arc`] snapshot under the lock
//! so they can never observe the kind of one load and the payload of
//! another.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::models::{CellValue, Dataset, DatasetKind, Table};

/// Max characters kept per line when paging text datasets.
const TEXT_LINE_LIMIT: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no dataset loaded")]
    Empty,
    #[error("stored dataset is not tabular")]
    NotTabular,
}

/// A loaded dataset plus its provenance.
#[derive(Debug, Clone)]
pub struct StoredDataset {
    pub dataset: Dataset,
    pub filename: String,
    pub loaded_at: DateTime<Utc>,
}

/// One page of rows from the stored dataset.
#[derive(Debug, Clone, Serialize)]
pub struct RowsPage {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub total_rows: usize,
}

/// Aggregates over the stored dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub kind: DatasetKind,
    pub column_sums: Vec<(String, CellValue)>,
    pub unique_counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bar => "Bar",
            Self::Line => "Line",
        }
    }
}

/// One plottable series derived from a numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<CellValue>,
}

/// The store itself. One instance serves the whole process; see
/// [`DatasetStore::global`].
#[derive(Debug, Default)]
pub struct DatasetStore {
    slot: RwLock<Option<Arc<StoredDataset>>>,
}

static STORE: OnceLock<DatasetStore> = OnceLock::new();

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store instance.
    pub fn global() -> &'static DatasetStore {
        STORE.get_or_init(DatasetStore::new)
    }

    /// Replace the stored dataset. The swap is atomic with respect to
    /// readers.
    pub fn replace(&self, dataset: Dataset, filename: impl Into<String>) {
        let filename = filename.into();
        let stored = Arc::new(StoredDataset {
            dataset,
            filename,
            loaded_at: Utc::now(),
        });
        info!(
            filename = %stored.filename,
            kind = stored.dataset.kind().as_str(),
            "dataset stored"
        );
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(stored);
    }

    /// Snapshot of the current dataset, if any.
    pub fn snapshot(&self) -> Option<Arc<StoredDataset>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn current(&self) -> Result<Arc<StoredDataset>, StoreError> {
        self.snapshot().ok_or(StoreError::Empty)
    }

    /// A page of rows. Text datasets page over their lines as a
    /// single-column table; blank lines are skipped in the page but still
    /// counted in the total.
    pub fn rows(&self, offset: usize, limit: usize) -> Result<RowsPage, StoreError> {
        let stored = self.current()?;
        match &stored.dataset {
            Dataset::Table(table) => {
                let page: Vec<Vec<CellValue>> = table
                    .rows
                    .iter()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect();
                Ok(RowsPage {
                    columns: table.columns.clone(),
                    rows: page,
                    total_rows: table.row_count(),
                })
            }
            Dataset::Text(text) => {
                let lines: Vec<&str> = text.split('\n').collect();
                let rows: Vec<Vec<CellValue>> = lines
                    .iter()
                    .skip(offset)
                    .take(limit)
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| {
                        let clipped: String = line.chars().take(TEXT_LINE_LIMIT).collect();
                        vec![CellValue::Text(clipped)]
                    })
                    .collect();
                Ok(RowsPage {
                    columns: vec!["Content".to_string()],
                    rows,
                    total_rows: lines.len(),
                })
            }
        }
    }

    /// Column sums and distinct counts for tables; character, word, and
    /// line counts for text.
    pub fn summary(&self) -> Result<DatasetSummary, StoreError> {
        let stored = self.current()?;
        match &stored.dataset {
            Dataset::Table(table) => Ok(DatasetSummary {
                kind: DatasetKind::Table,
                column_sums: table.column_sums(),
                unique_counts: table.unique_counts(),
            }),
            Dataset::Text(text) => {
                let chars = text.chars().count() as i64;
                let words = text.split_whitespace().count() as i64;
                let lines = text.split('\n').count() as i64;
                Ok(DatasetSummary {
                    kind: DatasetKind::Text,
                    column_sums: vec![
                        ("Total characters".to_string(), CellValue::Int(chars)),
                        ("Total words".to_string(), CellValue::Int(words)),
                        ("Total lines".to_string(), CellValue::Int(lines)),
                    ],
                    unique_counts: vec![("Content".to_string(), 1)],
                })
            }
        }
    }

    /// One bar and one line series per numeric column. Labels are row
    /// indices; null cells stay null so gaps survive into the chart.
    pub fn chart_series(&self) -> Result<Vec<ChartSeries>, StoreError> {
        let stored = self.current()?;
        let table = match &stored.dataset {
            Dataset::Table(table) => table,
            Dataset::Text(_) => return Err(StoreError::NotTabular),
        };

        let labels: Vec<String> = (0..table.row_count()).map(|i| i.to_string()).collect();
        let numeric = table.numeric_columns();

        let mut series = Vec::with_capacity(numeric.len() * 2);
        for kind in [ChartKind::Bar, ChartKind::Line] {
            for &col in &numeric {
                series.push(ChartSeries {
                    kind,
                    title: format!("{} Chart for {}", kind.label(), table.columns[col]),
                    labels: labels.clone(),
                    values: table.rows.iter().map(|row| row[col].clone()).collect(),
                });
            }
        }
        Ok(series)
    }

    /// The stored data as a table suitable for row sampling.
    ///
    /// Text datasets become a two-column table of non-blank numbered
    /// lines, so row-sample analysis works on any loaded file.
    pub fn sample_table(&self) -> Result<Table, StoreError> {
        let stored = self.current()?;
        match &stored.dataset {
            Dataset::Table(table) => Ok(table.clone()),
            Dataset::Text(text) => {
                let mut table = Table::new(vec!["line".to_string(), "content".to_string()]);
                for (i, line) in text.split('\n').enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    table.push_row(vec![
                        CellValue::Int((i + 1) as i64),
                        CellValue::Text(line.to_string()),
                    ]);
                }
                Ok(table)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_dataset() -> Dataset {
        let mut table = Table::new(vec!["id".to_string(), "value".to_string()]);
        for i in 0..5 {
            table.push_row(vec![CellValue::Int(i), CellValue::Int(i * 10)]);
        }
        Dataset::Table(table)
    }

    #[test]
    fn test_empty_store_errors() {
        let store = DatasetStore::new();
        assert_eq!(store.rows(0, 10).unwrap_err(), StoreError::Empty);
        assert_eq!(store.summary().unwrap_err(), StoreError::Empty);
        assert_eq!(store.chart_series().unwrap_err(), StoreError::Empty);
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_replace_swaps_whole_dataset() {
        let store = DatasetStore::new();
        store.replace(table_dataset(), "first.csv");
        store.replace(Dataset::Text("line one\nline two".to_string()), "doc.pdf");

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.filename, "doc.pdf");
        assert_eq!(snapshot.dataset.kind(), DatasetKind::Text);
    }

    #[test]
    fn test_rows_paging_clamps() {
        let store = DatasetStore::new();
        store.replace(table_dataset(), "data.csv");

        let page = store.rows(3, 10).unwrap();
        assert_eq!(page.total_rows, 5);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0][0], CellValue::Int(3));

        let beyond = store.rows(100, 10).unwrap();
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total_rows, 5);
    }

    #[test]
    fn test_text_rows_skip_blank_lines() {
        let store = DatasetStore::new();
        store.replace(
            Dataset::Text("alpha\n\nbeta\n   \ngamma".to_string()),
            "doc.pdf",
        );

        let page = store.rows(0, 10).unwrap();
        assert_eq!(page.columns, vec!["Content"]);
        // blank lines counted in total but absent from the page
        assert_eq!(page.total_rows, 5);
        assert_eq!(
            page.rows,
            vec![
                vec![CellValue::Text("alpha".to_string())],
                vec![CellValue::Text("beta".to_string())],
                vec![CellValue::Text("gamma".to_string())],
            ]
        );
    }

    #[test]
    fn test_text_rows_truncate_long_lines() {
        let store = DatasetStore::new();
        let long = "x".repeat(1500);
        store.replace(Dataset::Text(long), "doc.pdf");

        let page = store.rows(0, 1).unwrap();
        let CellValue::Text(content) = &page.rows[0][0] else {
            panic!("expected text cell");
        };
        assert_eq!(content.len(), TEXT_LINE_LIMIT);
    }

    #[test]
    fn test_summary_for_table_and_text() {
        let store = DatasetStore::new();
        store.replace(table_dataset(), "data.csv");
        let summary = store.summary().unwrap();
        assert_eq!(summary.kind, DatasetKind::Table);
        assert_eq!(
            summary.column_sums,
            vec![
                ("id".to_string(), CellValue::Int(10)),
                ("value".to_string(), CellValue::Int(100)),
            ]
        );

        store.replace(Dataset::Text("one two\nthree".to_string()), "doc.pdf");
        let summary = store.summary().unwrap();
        assert_eq!(summary.kind, DatasetKind::Text);
        assert_eq!(
            summary.column_sums,
            vec![
                ("Total characters".to_string(), CellValue::Int(13)),
                ("Total words".to_string(), CellValue::Int(3)),
                ("Total lines".to_string(), CellValue::Int(2)),
            ]
        );
        assert_eq!(summary.unique_counts, vec![("Content".to_string(), 1)]);
    }

    #[test]
    fn test_chart_series_per_numeric_column() {
        let store = DatasetStore::new();
        let mut table = Table::new(vec!["name".to_string(), "score".to_string()]);
        table.push_row(vec![
            CellValue::Text("a".to_string()),
            CellValue::Int(1),
        ]);
        table.push_row(vec![CellValue::Text("b".to_string()), CellValue::Null]);
        store.replace(Dataset::Table(table), "data.csv");

        let series = store.chart_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].kind, ChartKind::Bar);
        assert_eq!(series[0].title, "Bar Chart for score");
        assert_eq!(series[0].labels, vec!["0", "1"]);
        assert_eq!(series[0].values, vec![CellValue::Int(1), CellValue::Null]);
        assert_eq!(series[1].kind, ChartKind::Line);
        assert_eq!(series[1].title, "Line Chart for score");
    }

    #[test]
    fn test_chart_series_requires_table() {
        let store = DatasetStore::new();
        store.replace(Dataset::Text("words".to_string()), "doc.pdf");
        assert_eq!(store.chart_series().unwrap_err(), StoreError::NotTabular);
    }

    #[test]
    fn test_sample_table_from_text() {
        let store = DatasetStore::new();
        store.replace(Dataset::Text("first\n\nsecond".to_string()), "doc.pdf");

        let table = store.sample_table().unwrap();
        assert_eq!(table.columns, vec!["line", "content"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0],
            vec![CellValue::Int(1), CellValue::Text("first".to_string())]
        );
        // original line number survives the blank-line skip
        assert_eq!(
            table.rows[1],
            vec![CellValue::Int(3), CellValue::Text("second".to_string())]
        );
    }

    #[test]
    fn test_concurrent_replace_and_read() {
        use std::thread;

        let store = Arc::new(DatasetStore::new());
        let mut handles = Vec::new();

        for i in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..50 {
                    store.replace(table_dataset(), format!("file-{i}-{j}.csv"));
                }
            }));
        }
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    if let Some(snapshot) = store.snapshot() {
                        // kind and payload always come from the same load
                        assert_eq!(snapshot.dataset.kind(), DatasetKind::Table);
                        assert!(snapshot.filename.ends_with(".csv"));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
