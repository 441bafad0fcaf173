//! Format detection and decoding of uploaded documents.
//!
//! Dispatch is keyed on the file extension alone; content sniffing is out
//! of scope. Unknown extensions are rejected up front rather than guessed
//! at, so a misnamed file fails loudly instead of decoding as garbage.

mod csv;
mod excel;
mod pdf;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::models::Dataset;

/// Extensions the dispatcher will accept, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx", "pdf"];

/// Upload size ceiling shared by every ingestion path.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to decode {format} file: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn decode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            message: err.to_string(),
        }
    }
}

/// Decode a file into a [`Dataset`] based on its extension.
pub fn parse_file(path: &Path) -> Result<Dataset, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    debug!(path = %path.display(), format = %extension, "parsing file");

    match extension.as_str() {
        "csv" => csv::parse(path),
        "xls" | "xlsx" => excel::parse(path),
        "pdf" => pdf::parse(path),
        other => Err(ParseError::UnsupportedFormat(if other.is_empty() {
            "(none)".to_string()
        } else {
            other.to_string()
        })),
    }
}

/// Whether the extension is one the dispatcher understands.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}
