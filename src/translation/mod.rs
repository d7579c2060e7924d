//! Machine translation gateway
//!
//! The editing workflow only needs one primitive: translate a single string
//! from one site language into another. The [`Translator`] trait abstracts the
//! provider so the orchestrator can be exercised without network access.
//!
//! - [`HttpTranslator`] - MyMemory-compatible HTTP gateway
//! - [`MockTranslator`] - deterministic in-process translator for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use frontedit::translation::{HttpTranslator, Translator};
//! use frontedit::models::Language;
//!
//! let translator = HttpTranslator::from_env()?;
//! let thai = translator.translate("Safety First", Language::En, Language::Th).await?;
//! ```

pub mod http;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Language;

pub use http::{HttpTranslator, TranslationConfig};
pub use mock::{MockMode, MockTranslator};

/// Failure of a single translation call
///
/// Errors are cloneable strings so they can be aggregated into a
/// [`crate::orchestrator::TranslationResult`] and returned to API clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Transport-level failure (connection refused, DNS, TLS)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success HTTP status from the gateway
    #[error("Gateway returned HTTP {0}")]
    Status(u16),

    /// Gateway answered but reported a failure in its payload
    #[error("Gateway rejected request ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// Payload did not contain a translated text
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// Source text was empty or whitespace
    #[error("Nothing to translate")]
    EmptyText,

    /// Gateway could not be configured
    #[error("Translator configuration error: {0}")]
    Config(String),
}

impl TranslationError {
    /// Transient failures are worth retrying on the next save
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Gateway { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::EmptyText | Self::Config(_) => false,
        }
    }

    /// Localized description for notifications
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Http(msg) => format!("{}: {msg}", crate::i18n::t!("errors.translation.http")),
            Self::Timeout => crate::i18n::t!("errors.translation.timeout").to_string(),
            Self::Status(code) => {
                format!("{}: {code}", crate::i18n::t!("errors.translation.status"))
            }
            Self::Gateway { status, message } => format!(
                "{} ({status}): {message}",
                crate::i18n::t!("errors.translation.gateway")
            ),
            Self::MalformedResponse(msg) => {
                format!("{}: {msg}", crate::i18n::t!("errors.translation.malformed"))
            }
            Self::EmptyText => crate::i18n::t!("errors.translation.empty").to_string(),
            Self::Config(msg) => format!("{}: {msg}", crate::i18n::t!("errors.config.error")),
        }
    }
}

/// Result type for translation calls
pub type TranslationOutcome<T> = std::result::Result<T, TranslationError>;

/// Provider of single-string translations between site languages
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` into `target`
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> TranslationOutcome<String>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}
