//! Unified error handling for the frontedit crate
//!
//! Each layer keeps its own error enum ([`TranslationError`], [`StoreError`],
//! [`EditorError`]); this module folds them into a single [`Error`] for code
//! that crosses layer boundaries (the CLI, the HTTP API, configuration).
//!
//! # Architecture
//!
//! - [`FrontEditErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use frontedit::error::{Error, FrontEditErrorTrait};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         eprintln!("Try again: {}", err.localized_desc());
//!     } else {
//!         eprintln!("Failed: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::editor::EditorError;
pub use crate::server::ServerError;
pub use crate::storage::StoreError;
pub use crate::translation::TranslationError;

/// Common trait for frontedit error types
pub trait FrontEditErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport errors (HTTP client, timeouts)
    Network,
    /// Translation gateway rejected or garbled the request
    Translation,
    /// Database, filesystem and upload errors
    Storage,
    /// Actor lacks the required role
    Permission,
    /// Configuration and validation errors
    Config,
    /// Editor used out of sequence
    Editor,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Network => crate::i18n::t!("errors.category.network").to_string(),
            Self::Translation => crate::i18n::t!("errors.category.translation").to_string(),
            Self::Storage => crate::i18n::t!("errors.category.storage").to_string(),
            Self::Permission => crate::i18n::t!("errors.category.permission").to_string(),
            Self::Config => crate::i18n::t!("errors.category.config").to_string(),
            Self::Editor => crate::i18n::t!("errors.category.editor").to_string(),
            Self::Other => crate::i18n::t!("errors.category.other").to_string(),
        }
    }
}

/// Unified error type for the frontedit crate
#[derive(Error, Debug)]
pub enum Error {
    /// Translation gateway errors
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Editor state and permission errors
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// HTTP server startup and serve errors
    #[error("{0}")]
    Server(#[from] ServerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FrontEditErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Translation(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Editor(e) => e.is_recoverable(),
            Self::Server(e) => matches!(e, ServerError::BindError(_)),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Http(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Translation(e) => e.localized_desc(),
            Self::Store(e) => e.localized_desc(),
            Self::Editor(e) => e.localized_desc(),
            Self::Server(e) => e.to_string(),
            Self::Io(e) => format!("{}: {e}", crate::i18n::t!("errors.io.error")),
            Self::Json(e) => format!("{}: {e}", crate::i18n::t!("errors.json.error")),
            Self::Http(e) => format!("{}: {e}", crate::i18n::t!("errors.http.error")),
            Self::Config(msg) => format!("{}: {msg}", crate::i18n::t!("errors.config.error")),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Translation(e) => match e {
                TranslationError::Http(_) | TranslationError::Timeout => ErrorCategory::Network,
                TranslationError::Config(_) => ErrorCategory::Config,
                _ => ErrorCategory::Translation,
            },
            Self::Store(e) => store_category(e),
            Self::Editor(e) => match e {
                EditorError::Store(inner) => store_category(inner),
                EditorError::PermissionDenied(_) => ErrorCategory::Permission,
                EditorError::NoObjectStorage => ErrorCategory::Config,
                _ => ErrorCategory::Editor,
            },
            Self::Server(e) => match e {
                ServerError::ConfigError(_) => ErrorCategory::Config,
                ServerError::BindError(_) => ErrorCategory::Network,
                _ => ErrorCategory::Other,
            },
            Self::Io(_) => ErrorCategory::Storage,
            Self::Http(_) => ErrorCategory::Network,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

fn store_category(err: &StoreError) -> ErrorCategory {
    match err {
        StoreError::PermissionDenied { .. } => ErrorCategory::Permission,
        StoreError::InvalidField { .. } => ErrorCategory::Editor,
        _ => ErrorCategory::Storage,
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let timeout = Error::Translation(TranslationError::Timeout);
        assert_eq!(timeout.category(), ErrorCategory::Network);

        let gateway = Error::Translation(TranslationError::Gateway {
            status: 403,
            message: "quota".into(),
        });
        assert_eq!(gateway.category(), ErrorCategory::Translation);

        let denied = Error::Store(StoreError::PermissionDenied {
            actor: "guest".into(),
            action: "write".into(),
        });
        assert_eq!(denied.category(), ErrorCategory::Permission);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Translation(TranslationError::Status(503)).is_recoverable());
        assert!(!Error::Translation(TranslationError::EmptyText).is_recoverable());
        assert!(!Error::Editor(EditorError::NotEditing).is_recoverable());
    }

    #[test]
    fn test_editor_store_error_category() {
        let err = Error::Editor(EditorError::Store(StoreError::NotFound {
            table: "news".into(),
            id: 7,
        }));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = StoreError::Lock("poisoned".into()).into();
        assert!(matches!(unified, Error::Store(_)));

        let unified: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(unified, Error::Store(StoreError::Database(_))));
    }

    #[test]
    fn test_server_error() {
        let err: Error = ServerError::BindError("0.0.0.0:80 in use".into()).into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_recoverable());

        let err: Error = ServerError::ConfigError("no tokens".into()).into();
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("endpoint must not be empty");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.localized_desc(), "Something went wrong");
    }
}
