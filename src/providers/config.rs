//! Provider connection settings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// GigaChat connection settings.
///
/// Credentials resolve in order: a ready-made access token, a pre-encoded
/// authorization key, then a client id/secret pair that gets encoded on
/// the fly. Any one of the three is enough to construct the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GigaChatConfig {
    /// Ready-made bearer token; skips the credential exchange entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Pre-encoded authorization key for the credential exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Credential exchange endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Chat completion endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// OAuth scope sent with the credential exchange.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Verify TLS certificates on the GigaChat endpoints. Off by
    /// default: they present a national CA chain absent from stock
    /// trust stores.
    #[serde(default)]
    pub verify_ssl: bool,
}

fn default_auth_url() -> String {
    "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string()
}

fn default_api_url() -> String {
    "https://gigachat.devices.sberbank.ru/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "GigaChat".to_string()
}

fn default_scope() -> String {
    "GIGACHAT_API_PERS".to_string()
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl GigaChatConfig {
    /// Base default without env overrides (used internally to avoid recursion).
    pub fn base_default() -> Self {
        Self {
            access_token: None,
            auth_key: None,
            client_id: None,
            client_secret: None,
            auth_url: default_auth_url(),
            api_url: default_api_url(),
            model: default_model(),
            scope: default_scope(),
            verify_ssl: false,
        }
    }

    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::base_default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GIGACHAT_ACCESS_TOKEN` (or legacy `GIGACHAT_TOKEN`): ready-made token
    /// - `GIGACHAT_AUTH_KEY`: pre-encoded authorization key
    /// - `GIGACHAT_CLIENT_ID` / `GIGACHAT_CLIENT_SECRET`: credential pair
    /// - `GIGACHAT_AUTH_URL` / `GIGACHAT_API_URL`: endpoint overrides
    /// - `GIGACHAT_MODEL`: model name
    /// - `GIGACHAT_SCOPE`: OAuth scope
    /// - `GIGACHAT_VERIFY_SSL`: "true" to verify TLS certificates
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GIGACHAT_ACCESS_TOKEN") {
            self.access_token = Some(val);
        } else if let Ok(val) = std::env::var("GIGACHAT_TOKEN") {
            self.access_token = Some(val);
        }
        if let Ok(val) = std::env::var("GIGACHAT_AUTH_KEY") {
            self.auth_key = Some(val);
        }
        if let Ok(val) = std::env::var("GIGACHAT_CLIENT_ID") {
            self.client_id = Some(val);
        }
        if let Ok(val) = std::env::var("GIGACHAT_CLIENT_SECRET") {
            self.client_secret = Some(val);
        }
        if let Ok(val) = std::env::var("GIGACHAT_AUTH_URL") {
            self.auth_url = val;
        }
        if let Ok(val) = std::env::var("GIGACHAT_API_URL") {
            self.api_url = val;
        }
        if let Ok(val) = std::env::var("GIGACHAT_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("GIGACHAT_SCOPE") {
            self.scope = val;
        }
        if let Ok(val) = std::env::var("GIGACHAT_VERIFY_SSL") {
            self.verify_ssl = val.eq_ignore_ascii_case("true") || val == "1";
        }
        self
    }

    /// Whether any credential strategy can be attempted.
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.basic_auth_value().is_some()
    }

    /// The Basic authorization value for the credential exchange: the
    /// auth key as-is, or the encoded client id/secret pair.
    pub fn basic_auth_value(&self) -> Option<String> {
        if let Some(ref key) = self.auth_key {
            return Some(key.clone());
        }
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => {
                Some(BASE64.encode(format!("{}:{}", id, secret)))
            }
            _ => None,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn with_auth_url(mut self, url: &str) -> Self {
        self.auth_url = url.to_string();
        self
    }
}

/// Proxy aggregator connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyApiConfig {
    /// Whether the provider participates at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_proxy_url")]
    pub api_url: String,
}

fn default_enabled() -> bool {
    true
}

fn default_proxy_url() -> String {
    "https://api.proxyapi.ru/analyze".to_string()
}

impl Default for ProxyApiConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl ProxyApiConfig {
    pub fn base_default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            api_url: default_proxy_url(),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::base_default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `PROXY_ENABLED`: "true" or "false"
    /// - `PROXY_API_KEY`: bearer token
    /// - `PROXY_API_URL`: endpoint override
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("PROXY_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Ok(val) = std::env::var("PROXY_API_KEY") {
            self.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("PROXY_API_URL") {
            self.api_url = val;
        }
        self
    }

    /// Whether the client can make calls at all.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }
}
