//! frontedit - Multilingual inline content editing
//!
//! Backend for a four-language (English, Lao, Thai, Chinese) marketing site
//! whose editors change text in place. When an editor changes exactly one
//! language, the other three are machine-translated before everything is
//! saved.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Languages, multilingual values, content tables, actors
//! - [`translation`] - Translation gateway client and test double
//! - [`orchestrator`] - Change detection and concurrent translation fan-out
//! - [`storage`] - Settings and record repositories (SQLite), settings cache, media
//! - [`session`] - Process-wide edit mode
//! - [`editor`] - Inline text and image editor state machines
//! - [`server`] - HTTP API
//! - [`config`] - Configuration management and settings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use frontedit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Database::open("data/frontedit.db")?;
//!     let translator = Arc::new(HttpTranslator::from_env()?);
//!     let orchestrator = TranslationOrchestrator::new(translator);
//!
//!     let result = orchestrator.translate_from_english("Our services").await;
//!     let mut value = MultilingualValue::english("Our services");
//!     result.apply_to(&mut value);
//!
//!     let admin = Actor::new("admin", Role::Admin);
//!     db.settings().upsert(&admin, "services_title", &value, None).await?;
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod editor;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod session;
pub mod storage;
pub mod translation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::editor::{
        EditTarget, EditorContext, EditorPhase, ImageTarget, InlineImageEditor,
        InlineTextEditor,
    };
    pub use crate::error::{Error, ErrorCategory, FrontEditErrorTrait, Result};
    pub use crate::models::{Actor, ContentTable, FieldPrefix, Language, MultilingualValue, Role};
    pub use crate::orchestrator::{detect_changed_language, TranslationOrchestrator};
    pub use crate::session::EditModeSession;
    pub use crate::storage::{
        Database, RecordRepository, SettingsRepository, SettingsStore,
    };
    pub use crate::translation::{HttpTranslator, Translator};
}

// Direct re-exports for convenience
pub use models::{Language, MultilingualValue};
