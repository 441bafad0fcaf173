//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::bail;

use crate::parsers::{self, MAX_FILE_SIZE_BYTES, SUPPORTED_EXTENSIONS};

/// Validate a file before any decoding happens.
///
/// Checks existence, extension, and the size cap, so oversized or
/// unsupported files are refused without reading their contents.
/// Returns the file size on success.
pub fn check_file_admissible(path: &Path) -> anyhow::Result<u64> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    if !parsers::is_supported(path) {
        bail!(
            "Unsupported file format '{}' (supported: {})",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none"),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }
    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} (limit {})",
            format_bytes(size),
            format_bytes(MAX_FILE_SIZE_BYTES)
        );
    }
    Ok(size)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // cut on a char boundary; multi-byte text must never split a codepoint
    match s.char_indices().nth(max.saturating_sub(3)) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.2} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.2} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} bytes", bytes)
    }
}
