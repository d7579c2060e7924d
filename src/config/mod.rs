//! Configuration management for frontedit
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Actor, Language, Role};
use crate::storage::MediaConfig;
use crate::translation::TranslationConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation gateway configuration
    pub translation: TranslationConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Uploaded image storage
    pub media: MediaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Bearer tokens and the actors they resolve to
    pub auth: AuthConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/frontedit.db"),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind_address: String,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Language used when a request does not name one
    pub default_language: Language,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            enable_cors: true,
            enable_request_logging: true,
            default_language: Language::En,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Identity bound to a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub user_id: String,
    pub role: Role,
}

/// Token table used to resolve request actors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token value -> identity
    pub tokens: HashMap<String, AuthToken>,
}

impl AuthConfig {
    /// Actor for a bearer token; unknown or missing tokens are anonymous viewers
    pub fn resolve(&self, token: Option<&str>) -> Actor {
        token
            .and_then(|t| self.tokens.get(t))
            .map(|entry| Actor::new(entry.user_id.clone(), entry.role))
            .unwrap_or_else(Actor::anonymous)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let sqlite_path = std::env::var("FRONTEDIT_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/frontedit.db"))
            .into();

        let bind_address = std::env::var("FRONTEDIT_BIND_ADDRESS")
            .unwrap_or_else(|_| String::from("0.0.0.0:8080"));

        let enable_cors = std::env::var("FRONTEDIT_ENABLE_CORS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let default_language = match std::env::var("FRONTEDIT_DEFAULT_LANG") {
            Ok(v) => v
                .parse::<Language>()
                .map_err(anyhow::Error::msg)
                .context("Invalid FRONTEDIT_DEFAULT_LANG")?,
            Err(_) => Language::En,
        };

        let mut media = MediaConfig::default();
        if let Ok(dir) = std::env::var("FRONTEDIT_UPLOAD_DIR") {
            media.upload_dir = dir.into();
        }
        if let Ok(url) = std::env::var("FRONTEDIT_PUBLIC_MEDIA_URL") {
            media.public_base_url = url;
        }

        let log_level =
            std::env::var("FRONTEDIT_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("FRONTEDIT_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        let mut auth = AuthConfig::default();
        if let Ok(token) = std::env::var("FRONTEDIT_ADMIN_TOKEN") {
            auth.tokens.insert(
                token,
                AuthToken {
                    user_id: "admin".to_string(),
                    role: Role::Admin,
                },
            );
        }
        if let Ok(token) = std::env::var("FRONTEDIT_EDITOR_TOKEN") {
            auth.tokens.insert(
                token,
                AuthToken {
                    user_id: "editor".to_string(),
                    role: Role::Editor,
                },
            );
        }

        Ok(Self {
            translation: TranslationConfig::from_env(),
            database: DatabaseConfig { sqlite_path },
            server: ServerConfig {
                bind_address,
                enable_cors,
                enable_request_logging: true,
                default_language,
            },
            media,
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
            auth,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.translation.endpoint).with_context(|| {
            format!(
                "translation.endpoint is not a valid URL: {}",
                self.translation.endpoint
            )
        })?;

        if self.translation.timeout_secs == 0 {
            anyhow::bail!("translation.timeout_secs must be greater than 0");
        }

        if self.database.sqlite_path.as_os_str().is_empty() {
            anyhow::bail!("database.sqlite_path must not be empty");
        }

        if self.media.max_upload_bytes == 0 {
            anyhow::bail!("media.max_upload_bytes must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        if self.auth.tokens.keys().any(|t| t.trim().is_empty()) {
            anyhow::bail!("auth tokens must not be empty");
        }

        Ok(())
    }

    /// Get translation request timeout as Duration
    #[must_use]
    pub fn translation_timeout(&self) -> Duration {
        Duration::from_secs(self.translation.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = Config::default();
        config.translation.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_translation_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.translation_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_from_file_with_tokens() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
sqlite_path = "/tmp/site.db"

[auth.tokens.secret-1]
user_id = "somchai"
role = "editor"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.database.sqlite_path, PathBuf::from("/tmp/site.db"));
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");

        let actor = config.auth.resolve(Some("secret-1"));
        assert_eq!(actor.role, Role::Editor);
        assert_eq!(actor.id, "somchai");
    }

    #[test]
    fn test_unknown_token_is_viewer() {
        let auth = AuthConfig::default();
        assert_eq!(auth.resolve(Some("nope")).role, Role::Viewer);
        assert_eq!(auth.resolve(None).role, Role::Viewer);
    }
}
