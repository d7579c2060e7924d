//! Field-level access to content records
//!
//! Content rows are created and deleted by the admin screens; the editing
//! workflow only rewrites one multilingual field (all four language columns
//! together) or the image of an existing row.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{ensure_can_write, lock, SharedConnection, StoreError, StoreResult};
use crate::models::{Actor, ContentTable, FieldPrefix, Language, MultilingualValue};

/// Repository for multilingual fields of content records
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Create an empty row and return its id
    async fn create_record(&self, actor: &Actor, table: ContentTable) -> StoreResult<i64>;

    /// Read one multilingual field, `None` when the row does not exist
    async fn get_field(
        &self,
        table: ContentTable,
        id: i64,
        prefix: FieldPrefix,
    ) -> StoreResult<Option<MultilingualValue>>;

    /// Read the image URL, outer `None` when the row does not exist
    async fn get_image(&self, table: ContentTable, id: i64) -> StoreResult<Option<Option<String>>>;

    /// Write all four language columns of one field
    async fn update_field(
        &self,
        actor: &Actor,
        table: ContentTable,
        id: i64,
        prefix: FieldPrefix,
        value: &MultilingualValue,
    ) -> StoreResult<()>;

    /// Write the row's `image_url`
    async fn update_image(
        &self,
        actor: &Actor,
        table: ContentTable,
        id: i64,
        url: &str,
    ) -> StoreResult<()>;
}

/// Reject prefixes the table does not own
///
/// Callers pass enum tags, so this only fires on a wiring mistake.
fn ensure_field(table: ContentTable, prefix: FieldPrefix) -> StoreResult<()> {
    debug_assert!(
        table.has_field(prefix),
        "{table} has no multilingual field {prefix}"
    );
    if table.has_field(prefix) {
        Ok(())
    } else {
        Err(StoreError::InvalidField {
            table,
            field: prefix,
        })
    }
}

/// SQLite implementation of [`RecordRepository`]
pub struct SqliteRecordRepository {
    conn: SharedConnection,
}

impl SqliteRecordRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn create_record(&self, actor: &Actor, table: ContentTable) -> StoreResult<i64> {
        ensure_can_write(actor, "create content records")?;

        let conn = lock(&self.conn)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            &format!(
                "INSERT INTO {} (created_at, updated_at) VALUES (?1, ?1)",
                table.table_name()
            ),
            params![now],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(%table, id, "Content record created");
        Ok(id)
    }

    async fn get_field(
        &self,
        table: ContentTable,
        id: i64,
        prefix: FieldPrefix,
    ) -> StoreResult<Option<MultilingualValue>> {
        ensure_field(table, prefix)?;

        let conn = lock(&self.conn)?;
        let query = format!(
            "SELECT {}, {}, {}, {} FROM {} WHERE id = ?1",
            prefix.column(Language::En),
            prefix.column(Language::La),
            prefix.column(Language::Th),
            prefix.column(Language::Zh),
            table.table_name()
        );

        let value = conn
            .query_row(&query, params![id], |row| {
                Ok(MultilingualValue::from_columns(
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            })
            .optional()?;

        Ok(value)
    }

    async fn get_image(&self, table: ContentTable, id: i64) -> StoreResult<Option<Option<String>>> {
        let conn = lock(&self.conn)?;
        let image = conn
            .query_row(
                &format!("SELECT image_url FROM {} WHERE id = ?1", table.table_name()),
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;

        Ok(image)
    }

    async fn update_field(
        &self,
        actor: &Actor,
        table: ContentTable,
        id: i64,
        prefix: FieldPrefix,
        value: &MultilingualValue,
    ) -> StoreResult<()> {
        ensure_can_write(actor, "update content records")?;
        ensure_field(table, prefix)?;

        let conn = lock(&self.conn)?;
        let query = format!(
            "UPDATE {} SET {} = ?1, {} = ?2, {} = ?3, {} = ?4, updated_at = ?5 WHERE id = ?6",
            table.table_name(),
            prefix.column(Language::En),
            prefix.column(Language::La),
            prefix.column(Language::Th),
            prefix.column(Language::Zh),
        );

        let changed = conn.execute(
            &query,
            params![value.en, value.la, value.th, value.zh, Utc::now().to_rfc3339(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                table: table.table_name().to_string(),
                id,
            });
        }

        tracing::info!(%table, id, field = %prefix, actor = %actor.id, "Record field saved");
        Ok(())
    }

    async fn update_image(
        &self,
        actor: &Actor,
        table: ContentTable,
        id: i64,
        url: &str,
    ) -> StoreResult<()> {
        ensure_can_write(actor, "update content images")?;

        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET image_url = ?1, updated_at = ?2 WHERE id = ?3",
                table.table_name()
            ),
            params![url, Utc::now().to_rfc3339(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                table: table.table_name().to_string(),
                id,
            });
        }

        tracing::info!(%table, id, actor = %actor.id, "Record image saved");
        Ok(())
    }
}
