//! Inline editor for images

use tokio::sync::watch;

use super::{EditorContext, EditorError, EditorPhase, ImageTarget, Notification};
use crate::i18n::t;
use crate::metrics;
use crate::storage::{StoreError, StoreResult};

/// Editor for one image slot
///
/// The URL either comes from the user directly or from an upload through the
/// context's [`ObjectStorage`](crate::storage::ObjectStorage).
pub struct InlineImageEditor {
    ctx: EditorContext,
    target: ImageTarget,
    original: Option<String>,
    pending: Option<String>,
    phase: watch::Sender<EditorPhase>,
}

impl InlineImageEditor {
    pub fn new(ctx: EditorContext, target: ImageTarget) -> Self {
        let (phase, _rx) = watch::channel(EditorPhase::Display);
        Self {
            ctx,
            target,
            original: None,
            pending: None,
            phase,
        }
    }

    pub fn target(&self) -> &ImageTarget {
        &self.target
    }

    pub fn phase(&self) -> EditorPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<EditorPhase> {
        self.phase.subscribe()
    }

    pub fn controls_enabled(&self) -> bool {
        self.phase() == EditorPhase::Editing
    }

    /// URL stored when editing began
    pub fn original_url(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// URL that `save` would write
    pub fn pending_url(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    fn set_phase(&self, phase: EditorPhase) {
        self.phase.send_replace(phase);
    }

    /// Start editing; `Ok(false)` when edit mode is off or the actor cannot edit
    pub async fn open(&mut self) -> Result<bool, EditorError> {
        if !self.ctx.can_open() {
            return Ok(false);
        }
        if self.phase() != EditorPhase::Display {
            return Ok(true);
        }

        self.original = self.load().await?;
        self.pending = None;
        self.set_phase(EditorPhase::Editing);
        Ok(true)
    }

    async fn load(&self) -> StoreResult<Option<String>> {
        match &self.target {
            ImageTarget::Setting { key } => Ok(self
                .ctx
                .settings
                .fetch(key)
                .await?
                .and_then(|entry| entry.image_url)),
            ImageTarget::Record { table, id } => self
                .ctx
                .records
                .get_image(*table, *id)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    table: table.table_name().to_string(),
                    id: *id,
                }),
        }
    }

    /// Choose an already hosted image
    pub fn set_url(&mut self, url: impl Into<String>) {
        if self.phase() == EditorPhase::Editing {
            self.pending = Some(url.into());
        }
    }

    /// Upload a file and select the resulting URL
    pub async fn upload(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        content_type: &str,
    ) -> Result<String, EditorError> {
        if self.phase() != EditorPhase::Editing {
            return Err(EditorError::NotEditing);
        }
        let media = self.ctx.media.clone().ok_or(EditorError::NoObjectStorage)?;

        self.set_phase(EditorPhase::Saving);
        let uploaded = media.upload(bytes, file_name, content_type).await;
        self.set_phase(EditorPhase::Editing);

        match uploaded {
            Ok(url) => {
                self.pending = Some(url.clone());
                Ok(url)
            }
            Err(e) => {
                self.ctx.notifier.notify(Notification::error(t!(
                    "editor.save_failed",
                    reason = e.localized_desc()
                )));
                Err(e.into())
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.phase() != EditorPhase::Editing {
            return;
        }
        self.pending = None;
        self.original = None;
        self.set_phase(EditorPhase::Display);
    }

    /// Persist the selected URL and refresh
    ///
    /// Saving a setting image leaves its text untouched. Fails with
    /// [`EditorError::NoImageSelected`] when nothing was chosen.
    pub async fn save(&mut self) -> Result<String, EditorError> {
        if self.phase() != EditorPhase::Editing {
            return Err(EditorError::NotEditing);
        }
        let url = self.pending.clone().ok_or(EditorError::NoImageSelected)?;

        self.set_phase(EditorPhase::Saving);
        if let Err(e) = self.persist(&url).await {
            metrics::record_save(self.target.kind(), false);
            tracing::error!(target_id = %self.target, error = %e, "Image save failed");
            self.ctx.notifier.notify(Notification::error(t!(
                "editor.save_failed",
                reason = e.localized_desc()
            )));
            self.set_phase(EditorPhase::Editing);
            return Err(e.into());
        }

        metrics::record_save(self.target.kind(), true);
        self.ctx.refresh.refresh().await;
        self.ctx
            .notifier
            .notify(Notification::success(t!("editor.image_saved")));
        tracing::info!(target_id = %self.target, actor = %self.ctx.actor.id, %url, "Image saved");

        self.pending = None;
        self.original = None;
        self.set_phase(EditorPhase::Display);
        Ok(url)
    }

    async fn persist(&self, url: &str) -> StoreResult<()> {
        match &self.target {
            ImageTarget::Setting { key } => {
                let value = self
                    .ctx
                    .settings
                    .fetch(key)
                    .await?
                    .map(|entry| entry.value)
                    .unwrap_or_default();
                self.ctx
                    .settings
                    .upsert(&self.ctx.actor, key, &value, Some(url))
                    .await
            }
            ImageTarget::Record { table, id } => {
                self.ctx
                    .records
                    .update_image(&self.ctx.actor, *table, *id, url)
                    .await
            }
        }
    }
}
