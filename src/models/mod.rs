//! Data models for datasight.

mod analysis;
mod dataset;

pub use analysis::{
    AnalysisRequest, FailureKind, FileAnalysis, ProviderOutcome, ProviderResult, TableAnalysis,
};
pub use dataset::{CellValue, Dataset, DatasetKind, Table};
