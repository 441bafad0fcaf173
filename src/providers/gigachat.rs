//! GigaChat provider client.
//!
//! Auth is a two-step affair: a Basic-authorized credential exchange
//! yields a bearer token, which is then used for chat completions. The
//! token is cached for the lifetime of the client and only fetched when
//! missing; a ready-made access token in the config skips the exchange
//! entirely.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    prompts, AnalysisProvider, GigaChatConfig, ProviderError, ANALYSIS_TIMEOUT, AUTH_TIMEOUT,
};
use crate::models::AnalysisRequest;

pub struct GigaChatClient {
    config: GigaChatConfig,
    client: Client,
    /// Cached bearer token; filled on first use, never invalidated.
    token: Mutex<Option<String>>,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OauthResponse {
    access_token: String,
}

impl GigaChatClient {
    /// Create a new client. Construction never fails; missing or bad
    /// credentials surface as errors on the first call instead.
    pub fn new(config: GigaChatConfig) -> Self {
        let client = Client::builder()
            .timeout(ANALYSIS_TIMEOUT)
            // verification is opt-in: the production endpoints present a
            // national CA chain most containers do not carry
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GigaChatConfig {
        &self.config
    }

    /// Resolve a bearer token: configured token, cached token, or a fresh
    /// credential exchange, in that order.
    async fn obtain_token(&self) -> Result<String, ProviderError> {
        if let Some(ref token) = self.config.access_token {
            return Ok(token.clone());
        }

        // the lock is held across the exchange so concurrent calls share
        // a single attempt
        let mut cached = self.token.lock().await;
        if let Some(ref token) = *cached {
            return Ok(token.clone());
        }

        let basic = self
            .config
            .basic_auth_value()
            .ok_or_else(|| ProviderError::Auth("no usable credential configured".to_string()))?;

        debug!(url = %self.config.auth_url, "requesting access token");
        let resp = self
            .client
            .post(&self.config.auth_url)
            .timeout(AUTH_TIMEOUT)
            .header("Authorization", format!("Basic {}", basic))
            .header("RqUID", Uuid::new_v4().to_string())
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Auth(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let oauth: OauthResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Auth(format!("invalid token response: {}", e)))?;

        info!("access token acquired");
        *cached = Some(oauth.access_token.clone());
        Ok(oauth.access_token)
    }

    fn build_request_body(&self, request: &AnalysisRequest) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{}{}", prompts::ANALYSIS_PREFIX, request.prompt),
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

#[async_trait]
impl AnalysisProvider for GigaChatClient {
    fn name(&self) -> &str {
        "GigaChat"
    }

    async fn send_analysis_request(
        &self,
        request: &AnalysisRequest,
    ) -> Result<String, ProviderError> {
        let token = self.obtain_token().await?;
        let body = self.build_request_body(request);

        let mut call = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&token)
            .header("RqUID", Uuid::new_v4().to_string())
            .json(&body);
        if let Some(ref session) = request.session_id {
            call = call.header("X-Session-ID", session);
        }

        let resp = call.send().await.map_err(ProviderError::from_reqwest)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Remote(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Remote(format!("invalid response body: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Remote("response contained no choices".to_string()))
    }
}
