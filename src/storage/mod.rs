//! Persistence for site settings and content records
//!
//! Business logic talks to the [`SettingsRepository`] and [`RecordRepository`]
//! traits; the SQLite implementations share one connection owned by
//! [`Database`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Inline editors / HTTP API             │
//! └──────────────────────────────────────────────┘
//!            │                       │
//!            ▼                       ▼
//! ┌────────────────────┐   ┌────────────────────┐
//! │ SettingsRepository │   │  RecordRepository  │
//! └────────────────────┘   └────────────────────┘
//!            │                       │
//!            └───────────┬───────────┘
//!                        ▼
//!              ┌──────────────────┐
//!              │ SQLite (Database)│
//!              └──────────────────┘
//! ```
//!
//! Every write takes the acting [`Actor`] and is rejected unless it carries
//! an editor or admin role. UI layers check the same rule up front, but this
//! is the authoritative boundary.

pub mod media;
pub mod records;
pub mod settings;
pub mod store;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

use crate::models::{Actor, ContentTable, FieldPrefix, Language};

pub use media::{LocalMediaStorage, MediaConfig, ObjectStorage};
pub use records::{RecordRepository, SqliteRecordRepository};
pub use settings::{SettingsRepository, SqliteSettingsRepository};
pub use store::SettingsStore;

/// Errors raised by the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Target row does not exist
    #[error("{table} record {id} not found")]
    NotFound { table: String, id: i64 },

    /// Actor lacks the editor/admin role
    #[error("Permission denied: {actor} may not {action}")]
    PermissionDenied { actor: String, action: String },

    /// Field prefix not owned by the table
    #[error("Table {table} has no field {field}")]
    InvalidField { table: ContentTable, field: FieldPrefix },

    /// Connection mutex was poisoned
    #[error("Database lock poisoned: {0}")]
    Lock(String),

    /// Object storage upload failure
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Backend/network hiccups may succeed on retry; policy errors will not
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Lock(_) | Self::Upload(_) | Self::Io(_)
        )
    }

    pub fn localized_desc(&self) -> String {
        match self {
            Self::Database(e) => format!("{}: {e}", crate::i18n::t!("errors.store.database")),
            Self::NotFound { table, id } => {
                format!("{}: {table}/{id}", crate::i18n::t!("errors.store.not_found"))
            }
            Self::PermissionDenied { .. } => {
                crate::i18n::t!("errors.store.permission_denied").to_string()
            }
            Self::InvalidField { table, field } => {
                format!("{}: {table}.{field}", crate::i18n::t!("errors.store.invalid_field"))
            }
            Self::Lock(msg) => format!("{}: {msg}", crate::i18n::t!("errors.store.database")),
            Self::Upload(msg) => format!("{}: {msg}", crate::i18n::t!("errors.store.upload")),
            Self::Io(e) => format!("{}: {e}", crate::i18n::t!("errors.io.error")),
        }
    }
}

/// Result type for persistence operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reject writes from actors without edit permission
pub(crate) fn ensure_can_write(actor: &Actor, action: &str) -> StoreResult<()> {
    if actor.can_edit() {
        Ok(())
    } else {
        tracing::warn!(actor = %actor.id, action, "Write rejected by policy");
        Err(StoreError::PermissionDenied {
            actor: actor.id.clone(),
            action: action.to_string(),
        })
    }
}

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

pub(crate) fn lock(conn: &SharedConnection) -> StoreResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
}

/// Owner of the SQLite connection shared by all repositories
#[derive(Clone)]
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self::from_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite database initialized");
        Ok(db)
    }

    /// In-memory database (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn settings(&self) -> SqliteSettingsRepository {
        SqliteSettingsRepository::new(Arc::clone(&self.conn))
    }

    pub fn records(&self) -> SqliteRecordRepository {
        SqliteRecordRepository::new(Arc::clone(&self.conn))
    }
}

fn create_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
            CREATE TABLE IF NOT EXISTS site_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                setting_key TEXT NOT NULL UNIQUE,
                value_en TEXT,
                value_la TEXT,
                value_th TEXT,
                value_zh TEXT,
                image_url TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
    )?;

    for table in ContentTable::ALL {
        conn.execute_batch(&content_table_ddl(table))?;
    }

    Ok(())
}

fn content_table_ddl(table: ContentTable) -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for prefix in table.fields() {
        for lang in Language::ALL {
            columns.push(format!("{} TEXT", prefix.column(lang)));
        }
    }
    columns.push("image_url TEXT".to_string());
    columns.push(table.attribute_columns().to_string());
    columns.push("created_at TEXT NOT NULL".to_string());
    columns.push("updated_at TEXT NOT NULL".to_string());

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        table.table_name(),
        columns.join(", ")
    )
}
