//! Proxy aggregator provider client.
//!
//! Much simpler wire format than GigaChat: a bearer key and a single
//! `query` field in, a single `result` field out. Session affinity is
//! not supported, so the request's session id is ignored here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{prompts, AnalysisProvider, ProviderError, ProxyApiConfig, ANALYSIS_TIMEOUT};
use crate::models::AnalysisRequest;

pub struct ProxyApiClient {
    config: ProxyApiConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ProxyRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    result: String,
}

impl ProxyApiClient {
    pub fn new(config: ProxyApiConfig) -> Self {
        let client = Client::builder()
            .timeout(ANALYSIS_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn config(&self) -> &ProxyApiConfig {
        &self.config
    }

    fn build_query(&self, request: &AnalysisRequest) -> String {
        format!("{}{}", prompts::ANALYSIS_PREFIX, request.prompt)
    }
}

#[async_trait]
impl AnalysisProvider for ProxyApiClient {
    fn name(&self) -> &str {
        "ProxyAPI"
    }

    async fn send_analysis_request(
        &self,
        request: &AnalysisRequest,
    ) -> Result<String, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::Auth("provider is disabled".to_string()));
        }
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Auth("no API key configured".to_string()))?;

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(key)
            .json(&ProxyRequest {
                query: self.build_query(request),
            })
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Remote(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ProxyResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Remote(format!("invalid response body: {}", e)))?;

        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureKind;

    #[tokio::test]
    async fn test_disabled_client_refuses_to_send() {
        let config = ProxyApiConfig {
            enabled: false,
            ..ProxyApiConfig::base_default().with_api_key("k")
        };
        let client = ProxyApiClient::new(config);

        let err = client
            .send_analysis_request(&AnalysisRequest::new("data"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(err.to_string().contains("disabled"));
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let client = ProxyApiClient::new(ProxyApiConfig::base_default());
        let err = client
            .send_analysis_request(&AnalysisRequest::new("data"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Auth);
    }

    #[test]
    fn test_query_carries_prefix() {
        let client = ProxyApiClient::new(ProxyApiConfig::base_default());
        let query = client.build_query(&AnalysisRequest::new("| a |"));
        assert_eq!(query, "Analyze the following data:\n| a |");
    }

    #[test]
    fn test_name() {
        let client = ProxyApiClient::new(ProxyApiConfig::base_default());
        assert_eq!(client.name(), "ProxyAPI");
    }
}
