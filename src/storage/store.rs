//! Cached, language-aware settings accessor
//!
//! Public pages read every setting through this store. It keeps all rows in
//! memory, resolves the current UI language with English fallback, and is
//! refreshed after each save so the next render shows the new content.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{SettingsRepository, StoreResult};
use crate::editor::Refresh;
use crate::models::{Actor, Language, MultilingualValue, SettingEntry};

/// Read-through cache over a [`SettingsRepository`]
pub struct SettingsStore {
    repo: Arc<dyn SettingsRepository>,
    entries: RwLock<Option<HashMap<String, SettingEntry>>>,
    language: RwLock<Language>,
}

impl SettingsStore {
    pub fn new(repo: Arc<dyn SettingsRepository>, language: Language) -> Self {
        Self {
            repo,
            entries: RwLock::new(None),
            language: RwLock::new(language),
        }
    }

    pub fn repository(&self) -> &Arc<dyn SettingsRepository> {
        &self.repo
    }

    /// Current UI language
    pub fn language(&self) -> Language {
        *self.language.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write().unwrap_or_else(|e| e.into_inner()) = language;
    }

    /// Reload every setting from the repository
    pub async fn refresh(&self) -> StoreResult<usize> {
        let entries = self.repo.list().await?;
        let count = entries.len();
        let map = entries
            .into_iter()
            .map(|entry| (entry.setting_key.clone(), entry))
            .collect();

        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = Some(map);
        tracing::debug!(count, "Settings cache refreshed");
        Ok(count)
    }

    /// Drop the cache; the next `ensure_loaded` reloads it
    pub fn invalidate(&self) {
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Load the cache if it was never loaded or was invalidated
    pub async fn ensure_loaded(&self) -> StoreResult<()> {
        if !self.is_loaded() {
            self.refresh().await?;
        }
        Ok(())
    }

    fn with_entry<T>(&self, key: &str, f: impl FnOnce(&SettingEntry) -> T) -> Option<T> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .and_then(|map| map.get(key))
            .map(f)
    }

    /// Setting text in the current UI language, English fallback, `""` if unknown
    pub fn get(&self, key: &str) -> String {
        self.get_for(key, self.language())
    }

    /// Setting text in `lang`, English fallback, `""` if unknown
    pub fn get_for(&self, key: &str, lang: Language) -> String {
        self.with_entry(key, |entry| entry.value.get_or_fallback(lang).to_string())
            .unwrap_or_default()
    }

    /// Full four-language value, used to seed an editor
    pub fn get_value(&self, key: &str) -> Option<MultilingualValue> {
        self.with_entry(key, |entry| entry.value.clone())
    }

    pub fn get_image(&self, key: &str) -> Option<String> {
        self.with_entry(key, |entry| entry.image_url.clone()).flatten()
    }

    /// All cached entries ordered by key
    pub fn entries(&self) -> Vec<SettingEntry> {
        let mut entries: Vec<SettingEntry> = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.setting_key.cmp(&b.setting_key));
        entries
    }

    /// Write through to the repository, then reload the cache
    ///
    /// Only the write decides the result. A failed reload after a committed
    /// write drops the cache so the next read goes back to the repository.
    pub async fn upsert(
        &self,
        actor: &Actor,
        key: &str,
        value: &MultilingualValue,
        image_url: Option<&str>,
    ) -> StoreResult<()> {
        self.repo.upsert(actor, key, value, image_url).await?;
        <Self as Refresh>::refresh(self).await;
        Ok(())
    }
}

#[async_trait]
impl Refresh for SettingsStore {
    async fn refresh(&self) {
        if let Err(e) = SettingsStore::refresh(self).await {
            // Force a reload on the next read.
            tracing::warn!(error = %e, "Settings refresh failed");
            self.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::storage::Database;

    fn store() -> SettingsStore {
        let repo = Arc::new(Database::in_memory().unwrap().settings());
        SettingsStore::new(repo, Language::En)
    }

    fn editor() -> Actor {
        Actor::new("ed", Role::Editor)
    }

    #[tokio::test]
    async fn test_new_setting_falls_back_to_english() {
        let store = store();
        store
            .upsert(&editor(), "hero_badge", &MultilingualValue::english("Trusted Partner"), None)
            .await
            .unwrap();

        store.set_language(Language::Th);
        assert_eq!(store.get("hero_badge"), "Trusted Partner");
        assert_eq!(store.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_key_is_empty() {
        let store = store();
        store.refresh().await.unwrap();
        assert_eq!(store.get("missing"), "");
        assert_eq!(store.get_image("missing"), None);
    }

    #[tokio::test]
    async fn test_localized_value_preferred() {
        let store = store();
        let value = MultilingualValue {
            en: "Contact us".into(),
            zh: "联系我们".into(),
            ..Default::default()
        };
        store.upsert(&editor(), "contact_title", &value, Some("/c.jpg")).await.unwrap();

        assert_eq!(store.get_for("contact_title", Language::Zh), "联系我们");
        assert_eq!(store.get_for("contact_title", Language::La), "Contact us");
        assert_eq!(store.get_image("contact_title").as_deref(), Some("/c.jpg"));
    }

    #[tokio::test]
    async fn test_invalidate_and_reload() {
        let store = store();
        store.refresh().await.unwrap();
        assert!(store.is_loaded());

        store.invalidate();
        assert!(!store.is_loaded());

        store.ensure_loaded().await.unwrap();
        assert!(store.is_loaded());
    }

    /// Accepts writes but cannot list them back
    struct BrokenListing {
        inner: crate::storage::SqliteSettingsRepository,
    }

    #[async_trait]
    impl SettingsRepository for BrokenListing {
        async fn fetch(&self, key: &str) -> StoreResult<Option<SettingEntry>> {
            self.inner.fetch(key).await
        }

        async fn list(&self) -> StoreResult<Vec<SettingEntry>> {
            Err(crate::storage::StoreError::Lock("listing unavailable".into()))
        }

        async fn upsert(
            &self,
            actor: &Actor,
            key: &str,
            value: &MultilingualValue,
            image_url: Option<&str>,
        ) -> StoreResult<()> {
            self.inner.upsert(actor, key, value, image_url).await
        }
    }

    #[tokio::test]
    async fn test_committed_write_survives_failed_reload() {
        let db = Database::in_memory().unwrap();
        let store = SettingsStore::new(
            Arc::new(BrokenListing { inner: db.settings() }),
            Language::En,
        );

        let result = store
            .upsert(&editor(), "company_name", &MultilingualValue::english("Acme"), None)
            .await;

        assert!(result.is_ok());
        assert!(!store.is_loaded());
        let stored = db.settings().fetch("company_name").await.unwrap().unwrap();
        assert_eq!(stored.value.en, "Acme");
    }

    #[tokio::test]
    async fn test_failed_write_is_surfaced() {
        let store = store();
        let result = store
            .upsert(&Actor::anonymous(), "company_name", &MultilingualValue::english("x"), None)
            .await;
        assert!(result.is_err());
    }
}
