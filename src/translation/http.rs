//! HTTP translation gateway (MyMemory-compatible)
//!
//! Request: `GET <endpoint>?q=<text>&langpair=<source>|<target>`.
//! Response: JSON with `responseStatus` (200 on success) and
//! `responseData.translatedText`. Some deployments send `responseStatus`
//! as a string, so both forms are accepted.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{TranslationError, TranslationOutcome, Translator};
use crate::models::Language;

/// Default public gateway endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Configuration for the HTTP translation gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Gateway endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Contact email sent as `de=` (raises the gateway's daily quota)
    pub contact_email: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 15,
            contact_email: None,
        }
    }
}

impl TranslationConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("FRONTEDIT_TRANSLATE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            timeout_secs: std::env::var("FRONTEDIT_TRANSLATE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            contact_email: std::env::var("FRONTEDIT_TRANSLATE_EMAIL").ok(),
        }
    }
}

/// Translator backed by the HTTP gateway
#[derive(Clone)]
pub struct HttpTranslator {
    client: Client,
    config: TranslationConfig,
}

impl HttpTranslator {
    /// Create a translator with the given config
    pub fn new(config: TranslationConfig) -> TranslationOutcome<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TranslationError::Config(
                "Translation endpoint cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("frontedit/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TranslationError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a translator from environment variables
    pub fn from_env() -> TranslationOutcome<Self> {
        Self::new(TranslationConfig::from_env())
    }

    /// Gateway endpoint in use
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn parse_response(body: &Value) -> TranslationOutcome<String> {
        let status = match &body["responseStatus"] {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            TranslationError::MalformedResponse("missing 'responseStatus'".to_string())
        })?;

        if status != 200 {
            let message = body["responseDetails"]
                .as_str()
                .unwrap_or("unknown gateway error")
                .to_string();
            return Err(TranslationError::Gateway { status, message });
        }

        body["responseData"]["translatedText"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                TranslationError::MalformedResponse(
                    "missing 'responseData.translatedText'".to_string(),
                )
            })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> TranslationOutcome<String> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyText);
        }

        let langpair = format!("{}|{}", source.gateway_code(), target.gateway_code());
        let mut request = self
            .client
            .get(&self.config.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())]);

        if let Some(email) = &self.config.contact_email {
            request = request.query(&[("de", email.as_str())]);
        }

        tracing::debug!(%source, %target, chars = text.chars().count(), "Sending translation request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TranslationError::Timeout
            } else {
                TranslationError::Http(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(TranslationError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;

        Self::parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "MyMemory HTTP gateway"
    }
}
