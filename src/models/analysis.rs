//! Result types for the provider fan-out.
//!
//! A file or row-sample analysis always yields one labelled outcome per
//! configured provider; failures are data here, not errors, so one broken
//! provider never hides the other's answer.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::dataset::Dataset;

/// Prompt payload handed to a provider client.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt: String,
    /// Forwarded to providers that support session affinity.
    pub session_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Why a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    Timeout,
    Remote,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Timeout => "timeout",
            Self::Remote => "remote",
        }
    }
}

/// Outcome of a single provider attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderResult {
    Success {
        text: String,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
    /// The provider was never constructed (missing or disabled config).
    Unavailable,
}

impl ProviderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The line(s) that stand in for this outcome in a report section.
    pub fn report_text(&self, provider: &str) -> String {
        match self {
            Self::Success { text } => text.clone(),
            Self::Failure { message, .. } => format!("Error: {}", message),
            Self::Unavailable => format!("{} not available", provider),
        }
    }
}

/// One provider's labelled outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderOutcome {
    pub provider: String,
    pub result: ProviderResult,
}

/// Everything a whole-file analysis produces.
///
/// Present even when every provider failed; only a parse failure aborts
/// the operation before this exists.
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub dataset: Dataset,
    pub outcomes: Vec<ProviderOutcome>,
    /// Absent when report writing failed (non-fatal).
    pub report_path: Option<PathBuf>,
}

impl FileAnalysis {
    pub fn outcome(&self, provider: &str) -> Option<&ProviderResult> {
        self.outcomes
            .iter()
            .find(|o| o.provider == provider)
            .map(|o| &o.result)
    }

    /// Provider name to failure message, for callers that only want errors.
    pub fn errors(&self) -> BTreeMap<String, String> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                ProviderResult::Success { .. } => None,
                ProviderResult::Failure { message, .. } => {
                    Some((o.provider.clone(), message.clone()))
                }
                ProviderResult::Unavailable => Some((
                    o.provider.clone(),
                    format!("{} not available", o.provider),
                )),
            })
            .collect()
    }
}

/// Result of analyzing the first rows of the stored table.
///
/// `results` always carries one entry per provider; a failed provider maps
/// to `None` there and to its message in `errors`. No report is written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableAnalysis {
    pub results: BTreeMap<String, Option<String>>,
    pub errors: BTreeMap<String, String>,
}
