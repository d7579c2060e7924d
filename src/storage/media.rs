//! Object storage for uploaded images
//!
//! The hosted bucket is an external collaborator; the editors only need
//! "store these bytes, give me a public URL". [`LocalMediaStorage`] writes
//! into a directory served by the web frontend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Upload target for image editors
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` and return the public URL
    async fn upload(&self, bytes: &[u8], file_name: &str, content_type: &str)
        -> StoreResult<String>;
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory uploads are written to
    pub upload_dir: PathBuf,

    /// URL prefix the directory is served under
    pub public_base_url: String,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("data/uploads"),
            public_base_url: String::from("/uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Filesystem-backed [`ObjectStorage`]
pub struct LocalMediaStorage {
    config: MediaConfig,
}

impl LocalMediaStorage {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }
}

/// Keep ASCII alphanumerics, dots, dashes and underscores
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ObjectStorage for LocalMediaStorage {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        content_type: &str,
    ) -> StoreResult<String> {
        if !content_type.starts_with("image/") {
            return Err(StoreError::Upload(format!(
                "unsupported content type {content_type}"
            )));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(StoreError::Upload(format!(
                "file exceeds {} bytes",
                self.config.max_upload_bytes
            )));
        }

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        tokio::fs::write(self.config.upload_dir.join(&stored_name), bytes).await?;

        let url = format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            stored_name
        );
        tracing::info!(%url, size = bytes.len(), "Image uploaded");
        Ok(url)
    }
}
