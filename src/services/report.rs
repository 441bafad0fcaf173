//! Plain-text report generation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::models::ProviderOutcome;

const REPORT_TITLE: &str = "Neural network analysis";

/// Writes timestamped analysis reports into a fixed directory.
pub struct ReportWriter {
    reports_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Write one report covering every provider outcome, in order.
    ///
    /// Each section is the provider's name as a header followed by its
    /// text, its failure marker, or its unavailability placeholder.
    pub fn write(&self, outcomes: &[ProviderOutcome]) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.reports_dir)?;

        let filename = format!("report_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.reports_dir.join(filename);

        let mut content = String::new();
        content.push_str(REPORT_TITLE);
        content.push_str("\n\n");
        for outcome in outcomes {
            content.push_str(&outcome.provider);
            content.push_str(":\n");
            content.push_str(&outcome.result.report_text(&outcome.provider));
            content.push_str("\n\n");
        }

        fs::write(&path, &content)?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }
}
