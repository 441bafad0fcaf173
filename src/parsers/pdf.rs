//! PDF text extraction.

use std::path::Path;

use super::ParseError;
use crate::models::Dataset;

/// Extract the text content of a PDF, page by page.
///
/// Pages that yield no text contribute nothing rather than failing the
/// document; a fully image-based PDF therefore decodes to an empty text
/// dataset, not an error.
pub fn parse(path: &Path) -> Result<Dataset, ParseError> {
    let raw = pdf_extract::extract_text(path).map_err(|e| ParseError::decode("pdf", e))?;
    Ok(Dataset::Text(join_pages(&raw)))
}

// pdf-extract delimits pages with form feeds
fn join_pages(raw: &str) -> String {
    let joined: String = raw
        .split('\u{c}')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    joined.trim_end().to_string()
}
