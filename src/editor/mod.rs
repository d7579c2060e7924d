//! Inline text and image editors
//!
//! Each editable element on a page owns one editor. An editor is a small
//! state machine:
//!
//! ```text
//!            open()            save()                 persisted
//! Display ─────────▶ Editing ─────────▶ Translating ─────────▶ Saving ──▶ Display
//!    ▲                 │  ▲                  │                   │
//!    └──── cancel() ───┘  └─────── persistence failure ──────────┘
//! ```
//!
//! `Translating` is skipped when detection finds nothing to translate. Phase
//! changes are published on a `watch` channel so the UI can show a busy
//! indicator that tells translating apart from saving.

pub mod image;
pub mod text;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::models::{Actor, ContentTable, FieldPrefix, Language, MultilingualValue};
use crate::orchestrator::TranslationOrchestrator;
use crate::session::EditModeSession;
use crate::storage::{ObjectStorage, RecordRepository, SettingsRepository, StoreError};

pub use image::InlineImageEditor;
pub use text::InlineTextEditor;

/// Editor lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorPhase {
    #[default]
    Display,
    Editing,
    Translating,
    Saving,
}

impl EditorPhase {
    /// Translating or saving; controls are disabled
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Translating | Self::Saving)
    }
}

impl fmt::Display for EditorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Display => "display",
            Self::Editing => "editing",
            Self::Translating => "translating",
            Self::Saving => "saving",
        };
        f.write_str(name)
    }
}

/// In-progress edit of a multilingual value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Snapshot taken when editing began
    pub original: MultilingualValue,

    /// Working copy
    pub current: MultilingualValue,

    /// Language tab shown to the editor
    pub active_tab: Language,
}

impl EditSession {
    pub fn new(value: MultilingualValue) -> Self {
        Self {
            current: value.clone(),
            original: value,
            active_tab: Language::En,
        }
    }
}

/// Callback run after a successful save so displayed content reloads
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(&self);
}

/// Refresh that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRefresh;

#[async_trait]
impl Refresh for NoRefresh {
    async fn refresh(&self) {}
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// Toast-style message shown to the editing user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(message = %notification.message, "notify"),
            NotificationLevel::Warning => tracing::warn!(message = %notification.message, "notify"),
            NotificationLevel::Error => tracing::error!(message = %notification.message, "notify"),
        }
    }
}

/// Collects notifications in memory
///
/// The HTTP API returns them to the client as warnings; tests inspect them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    items: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Drain collected notifications
    pub fn take(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut items) = self.items.lock() {
            items.push(notification);
        }
    }
}

/// What a text editor edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Site setting by key
    Setting { key: String },

    /// One multilingual field of a content record
    Field {
        table: ContentTable,
        id: i64,
        prefix: FieldPrefix,
    },
}

impl EditTarget {
    pub fn setting(key: impl Into<String>) -> Self {
        Self::Setting { key: key.into() }
    }

    /// Record field target; rejects prefixes the table does not own
    pub fn field(table: ContentTable, id: i64, prefix: FieldPrefix) -> Result<Self, StoreError> {
        if table.has_field(prefix) {
            Ok(Self::Field { table, id, prefix })
        } else {
            Err(StoreError::InvalidField {
                table,
                field: prefix,
            })
        }
    }

    /// Label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Setting { .. } => "setting",
            Self::Field { .. } => "record",
        }
    }
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setting { key } => write!(f, "setting:{key}"),
            Self::Field { table, id, prefix } => write!(f, "{table}/{id}/{prefix}"),
        }
    }
}

/// What an image editor edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    Setting { key: String },
    Record { table: ContentTable, id: i64 },
}

impl ImageTarget {
    pub fn setting(key: impl Into<String>) -> Self {
        Self::Setting { key: key.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Setting { .. } => "setting_image",
            Self::Record { .. } => "record_image",
        }
    }
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setting { key } => write!(f, "setting:{key}:image"),
            Self::Record { table, id } => write!(f, "{table}/{id}/image"),
        }
    }
}

/// Result of a successful text save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// Value as persisted
    pub value: MultilingualValue,

    /// Language the translations were produced from, if any
    pub translated_from: Option<Language>,

    /// Target languages whose translation failed and kept the literal value
    pub failed_languages: Vec<Language>,

    /// Image written in the same save, if one was set
    pub image_url: Option<String>,
}

/// Errors raised by the editors
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor is not in editing state")]
    NotEditing,

    #[error("Edit mode is disabled")]
    EditModeDisabled,

    #[error("Actor {0} may not edit content")]
    PermissionDenied(String),

    #[error("No image selected")]
    NoImageSelected,

    #[error("No object storage configured for uploads")]
    NoObjectStorage,

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl EditorError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_recoverable(),
            _ => false,
        }
    }

    pub fn localized_desc(&self) -> String {
        match self {
            Self::NotEditing => crate::i18n::t!("errors.editor.not_editing").to_string(),
            Self::EditModeDisabled => {
                crate::i18n::t!("errors.editor.edit_mode_disabled").to_string()
            }
            Self::PermissionDenied(_) => {
                crate::i18n::t!("errors.store.permission_denied").to_string()
            }
            Self::NoImageSelected => crate::i18n::t!("errors.editor.no_image").to_string(),
            Self::NoObjectStorage => crate::i18n::t!("errors.editor.no_storage").to_string(),
            Self::Store(e) => e.localized_desc(),
        }
    }
}

/// Collaborators shared by all editors of one actor
#[derive(Clone)]
pub struct EditorContext {
    pub actor: Actor,
    pub edit_mode: Arc<EditModeSession>,
    pub orchestrator: Arc<TranslationOrchestrator>,
    pub settings: Arc<dyn SettingsRepository>,
    pub records: Arc<dyn RecordRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub refresh: Arc<dyn Refresh>,
    pub media: Option<Arc<dyn ObjectStorage>>,
}

impl EditorContext {
    pub fn new(
        actor: Actor,
        edit_mode: Arc<EditModeSession>,
        orchestrator: Arc<TranslationOrchestrator>,
        settings: Arc<dyn SettingsRepository>,
        records: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            actor,
            edit_mode,
            orchestrator,
            settings,
            records,
            notifier: Arc::new(TracingNotifier),
            refresh: Arc::new(NoRefresh),
            media: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_refresh(mut self, refresh: Arc<dyn Refresh>) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_media(mut self, media: Arc<dyn ObjectStorage>) -> Self {
        self.media = Some(media);
        self
    }

    /// Same collaborators acting as someone else
    pub fn for_actor(&self, actor: Actor) -> Self {
        Self {
            actor,
            ..self.clone()
        }
    }

    /// Edit mode is on and the actor may edit
    pub fn can_open(&self) -> bool {
        self.edit_mode.is_enabled() && self.actor.can_edit()
    }

    /// Why `can_open` is false, if it is
    pub(crate) fn open_denial(&self) -> Option<EditorError> {
        if !self.actor.can_edit() {
            Some(EditorError::PermissionDenied(self.actor.id.clone()))
        } else if !self.edit_mode.is_enabled() {
            Some(EditorError::EditModeDisabled)
        } else {
            None
        }
    }
}
