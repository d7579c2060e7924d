//! Inline editor for multilingual text

use tokio::sync::watch;

use super::{
    EditSession, EditTarget, EditorContext, EditorError, EditorPhase, Notification, SaveOutcome,
};
use crate::i18n::t;
use crate::metrics;
use crate::models::{Language, MultilingualValue};
use crate::orchestrator::detect_changed_language;
use crate::storage::{StoreError, StoreResult};

/// Editor for one multilingual text element
pub struct InlineTextEditor {
    ctx: EditorContext,
    target: EditTarget,
    session: Option<EditSession>,
    image: Option<String>,
    phase: watch::Sender<EditorPhase>,
}

impl InlineTextEditor {
    pub fn new(ctx: EditorContext, target: EditTarget) -> Self {
        let (phase, _rx) = watch::channel(EditorPhase::Display);
        Self {
            ctx,
            target,
            session: None,
            image: None,
            phase,
        }
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn phase(&self) -> EditorPhase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase change
    pub fn subscribe(&self) -> watch::Receiver<EditorPhase> {
        self.phase.subscribe()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Inputs, tabs and buttons accept interaction
    pub fn controls_enabled(&self) -> bool {
        self.phase() == EditorPhase::Editing
    }

    fn set_phase(&self, phase: EditorPhase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            tracing::debug!(target_id = %self.target, from = %previous, to = %phase, "Editor phase");
        }
    }

    /// Start editing with the persisted value
    ///
    /// Returns `Ok(false)` without touching anything when edit mode is off or
    /// the actor cannot edit; the element then renders as plain content.
    pub async fn open(&mut self) -> Result<bool, EditorError> {
        if !self.ctx.can_open() {
            return Ok(false);
        }
        if self.phase() != EditorPhase::Display {
            return Ok(true);
        }

        let value = self.load().await?;
        Ok(self.open_with(value))
    }

    /// Start editing with a value the caller already holds
    pub fn open_with(&mut self, value: MultilingualValue) -> bool {
        if !self.ctx.can_open() {
            return false;
        }
        if self.phase() != EditorPhase::Display {
            return true;
        }

        self.session = Some(EditSession::new(value));
        self.set_phase(EditorPhase::Editing);
        true
    }

    async fn load(&self) -> StoreResult<MultilingualValue> {
        match &self.target {
            EditTarget::Setting { key } => Ok(self
                .ctx
                .settings
                .fetch(key)
                .await?
                .map(|entry| entry.value)
                .unwrap_or_default()),
            EditTarget::Field { table, id, prefix } => self
                .ctx
                .records
                .get_field(*table, *id, *prefix)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    table: table.table_name().to_string(),
                    id: *id,
                }),
        }
    }

    fn editing_session(&mut self) -> Option<&mut EditSession> {
        if self.phase() == EditorPhase::Editing {
            self.session.as_mut()
        } else {
            None
        }
    }

    pub fn select_tab(&mut self, lang: Language) {
        if let Some(session) = self.editing_session() {
            session.active_tab = lang;
        }
    }

    /// Replace the text of one language
    pub fn set_text(&mut self, lang: Language, text: impl Into<String>) {
        if let Some(session) = self.editing_session() {
            session.current.set(lang, text);
        }
    }

    /// Replace the text of the active tab
    pub fn set_active_text(&mut self, text: impl Into<String>) {
        if let Some(session) = self.editing_session() {
            let lang = session.active_tab;
            session.current.set(lang, text);
        }
    }

    /// Replace the whole working copy
    pub fn set_value(&mut self, value: MultilingualValue) {
        if let Some(session) = self.editing_session() {
            session.current = value;
        }
    }

    /// Image URL written together with the text on save
    ///
    /// A setting stores both in one upsert. A record field writes its columns
    /// first and then the row's image.
    pub fn set_image(&mut self, url: impl Into<String>) {
        if self.phase() == EditorPhase::Editing {
            self.image = Some(url.into());
        }
    }

    pub fn pending_image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Discard the edit without persisting
    pub fn cancel(&mut self) {
        if self.phase() != EditorPhase::Editing {
            return;
        }
        self.session = None;
        self.image = None;
        self.set_phase(EditorPhase::Display);
    }

    /// Translate if exactly one language changed, persist all four, refresh
    ///
    /// On persistence failure the editor stays open with the user's input
    /// untouched and the error is returned.
    pub async fn save(&mut self) -> Result<SaveOutcome, EditorError> {
        let (original, mut value) = match (&self.session, self.phase()) {
            (Some(session), EditorPhase::Editing) => {
                (session.original.clone(), session.current.clone())
            }
            _ => return Err(EditorError::NotEditing),
        };

        let translated_from = detect_changed_language(&original, &value);
        let mut failed_languages = Vec::new();

        if let Some(source) = translated_from {
            self.set_phase(EditorPhase::Translating);
            let result = self
                .ctx
                .orchestrator
                .translate_to_other_languages(value.get(source), source)
                .await;
            result.apply_to(&mut value);
            failed_languages = result.failed_languages();
        }

        self.set_phase(EditorPhase::Saving);
        if let Err(e) = self.persist(&value).await {
            metrics::record_save(self.target.kind(), false);
            tracing::error!(target_id = %self.target, error = %e, "Save failed");
            self.ctx.notifier.notify(Notification::error(t!(
                "editor.save_failed",
                reason = e.localized_desc()
            )));
            self.set_phase(EditorPhase::Editing);
            return Err(e.into());
        }

        metrics::record_save(self.target.kind(), true);
        self.ctx.refresh.refresh().await;

        if !failed_languages.is_empty() {
            let languages = failed_languages
                .iter()
                .map(|lang| lang.display_name())
                .collect::<Vec<_>>()
                .join(", ");
            self.ctx
                .notifier
                .notify(Notification::warning(t!("editor.translation_partial", languages = languages)));
        }
        self.ctx
            .notifier
            .notify(Notification::success(t!("editor.saved")));

        tracing::info!(
            target_id = %self.target,
            actor = %self.ctx.actor.id,
            translated_from = ?translated_from,
            "Content saved"
        );

        self.session = None;
        let image_url = self.image.take();
        self.set_phase(EditorPhase::Display);

        Ok(SaveOutcome {
            value,
            translated_from,
            failed_languages,
            image_url,
        })
    }

    async fn persist(&self, value: &MultilingualValue) -> StoreResult<()> {
        match &self.target {
            EditTarget::Setting { key } => {
                self.ctx
                    .settings
                    .upsert(&self.ctx.actor, key, value, self.image.as_deref())
                    .await
            }
            EditTarget::Field { table, id, prefix } => {
                self.ctx
                    .records
                    .update_field(&self.ctx.actor, *table, *id, *prefix, value)
                    .await?;
                match &self.image {
                    Some(url) => {
                        self.ctx
                            .records
                            .update_image(&self.ctx.actor, *table, *id, url)
                            .await
                    }
                    None => Ok(()),
                }
            }
        }
    }
}
