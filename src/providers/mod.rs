//! Analysis provider clients.
//!
//! Two heterogeneous LLM backends answer the same analysis prompts: the
//! GigaChat chat-completion API and a proxy aggregator with its own tiny
//! request shape. Both hide behind [`AnalysisProvider`], so the
//! orchestrator never knows which wire format it is talking to.

mod config;
mod gigachat;
pub mod prompts;
mod proxy_api;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AnalysisRequest, FailureKind};

pub use config::{GigaChatConfig, ProxyApiConfig};
pub use gigachat::GigaChatClient;
pub use proxy_api::ProxyApiClient;

/// Deadline for credential exchanges.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for analysis calls.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No usable credential, or the credential exchange was refused.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Network deadline exceeded.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Non-2xx response or transport failure.
    #[error("remote error: {0}")]
    Remote(String),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Auth(_) => FailureKind::Auth,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Remote(_) => FailureKind::Remote,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Remote(err.to_string())
        }
    }
}

/// A backend that can answer an analysis prompt.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Display name; doubles as the report section header and error-map key.
    fn name(&self) -> &str;

    async fn send_analysis_request(
        &self,
        request: &AnalysisRequest,
    ) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ProviderError::Auth("no key".to_string()).kind(),
            FailureKind::Auth
        );
        assert_eq!(
            ProviderError::Timeout("30s".to_string()).kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            ProviderError::Remote("HTTP 500".to_string()).kind(),
            FailureKind::Remote
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Remote("HTTP 502: bad gateway".to_string());
        assert_eq!(err.to_string(), "remote error: HTTP 502: bad gateway");
    }
}
