//! Site settings repository
//!
//! Key-value table of site-wide strings and images, one row per
//! `setting_key`, each with four language columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{ensure_can_write, lock, SharedConnection, StoreResult};
use crate::models::{Actor, MultilingualValue, SettingEntry};

/// Repository for site settings
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch one setting
    async fn fetch(&self, key: &str) -> StoreResult<Option<SettingEntry>>;

    /// Fetch all settings ordered by key
    async fn list(&self) -> StoreResult<Vec<SettingEntry>>;

    /// Insert the setting or update its language columns
    ///
    /// The image column is only written when `image_url` is `Some`.
    /// Repeating the same call leaves the stored row unchanged.
    async fn upsert(
        &self,
        actor: &Actor,
        key: &str,
        value: &MultilingualValue,
        image_url: Option<&str>,
    ) -> StoreResult<()>;
}

/// SQLite implementation of [`SettingsRepository`]
pub struct SqliteSettingsRepository {
    conn: SharedConnection,
}

impl SqliteSettingsRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<SettingEntry> {
        Ok(SettingEntry {
            setting_key: row.get(0)?,
            value: MultilingualValue::from_columns(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?),
            image_url: row.get(5)?,
            updated_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(6)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn fetch(&self, key: &str) -> StoreResult<Option<SettingEntry>> {
        let conn = lock(&self.conn)?;
        let entry = conn
            .query_row(
                "SELECT setting_key, value_en, value_la, value_th, value_zh, image_url, updated_at
                 FROM site_settings WHERE setting_key = ?1",
                params![key],
                Self::map_row,
            )
            .optional()?;

        Ok(entry)
    }

    async fn list(&self) -> StoreResult<Vec<SettingEntry>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT setting_key, value_en, value_la, value_th, value_zh, image_url, updated_at
             FROM site_settings ORDER BY setting_key",
        )?;

        let entries = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    async fn upsert(
        &self,
        actor: &Actor,
        key: &str,
        value: &MultilingualValue,
        image_url: Option<&str>,
    ) -> StoreResult<()> {
        ensure_can_write(actor, "update site settings")?;

        let conn = lock(&self.conn)?;
        let now = Utc::now().to_rfc3339();

        // SET expressions see the pre-update row, so updated_at only moves
        // when a stored column actually changes.
        conn.execute(
            r#"
                INSERT INTO site_settings
                    (setting_key, value_en, value_la, value_th, value_zh, image_url, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(setting_key) DO UPDATE SET
                    value_en = excluded.value_en,
                    value_la = excluded.value_la,
                    value_th = excluded.value_th,
                    value_zh = excluded.value_zh,
                    image_url = COALESCE(excluded.image_url, site_settings.image_url),
                    updated_at = CASE
                        WHEN site_settings.value_en IS excluded.value_en
                         AND site_settings.value_la IS excluded.value_la
                         AND site_settings.value_th IS excluded.value_th
                         AND site_settings.value_zh IS excluded.value_zh
                         AND site_settings.image_url IS COALESCE(excluded.image_url, site_settings.image_url)
                        THEN site_settings.updated_at
                        ELSE excluded.updated_at
                    END
                "#,
            params![key, value.en, value.la, value.th, value.zh, image_url, now],
        )?;

        tracing::info!(key, actor = %actor.id, image = image_url.is_some(), "Setting saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::storage::{Database, StoreError};

    fn editor() -> Actor {
        Actor::new("editor-1", Role::Editor)
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let repo = Database::in_memory().unwrap().settings();

        repo.upsert(&editor(), "company_name", &MultilingualValue::english("Acme"), None)
            .await
            .unwrap();
        repo.upsert(&editor(), "company_name", &MultilingualValue::english("Acme Logistics"), None)
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value.en, "Acme Logistics");
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = Database::in_memory().unwrap().settings();
        let value = MultilingualValue::english("Trusted Partner");

        repo.upsert(&editor(), "hero_badge", &value, Some("/img/badge.png"))
            .await
            .unwrap();
        let first = repo.fetch("hero_badge").await.unwrap().unwrap();

        repo.upsert(&editor(), "hero_badge", &value, Some("/img/badge.png"))
            .await
            .unwrap();
        let second = repo.fetch("hero_badge").await.unwrap().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_image_untouched_when_absent() {
        let repo = Database::in_memory().unwrap().settings();
        repo.upsert(&editor(), "logo", &MultilingualValue::english("Logo"), Some("/logo.png"))
            .await
            .unwrap();
        repo.upsert(&editor(), "logo", &MultilingualValue::english("New logo"), None)
            .await
            .unwrap();

        let entry = repo.fetch("logo").await.unwrap().unwrap();
        assert_eq!(entry.image_url.as_deref(), Some("/logo.png"));
        assert_eq!(entry.value.en, "New logo");
    }

    #[tokio::test]
    async fn test_viewer_cannot_write() {
        let repo = Database::in_memory().unwrap().settings();
        let result = repo
            .upsert(&Actor::anonymous(), "company_name", &MultilingualValue::english("x"), None)
            .await;

        assert!(matches!(result, Err(StoreError::PermissionDenied { .. })));
        assert!(repo.fetch("company_name").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_missing_key() {
        let repo = Database::in_memory().unwrap().settings();
        assert!(repo.fetch("nope").await.unwrap().is_none());
    }
}
