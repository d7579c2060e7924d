//! HTTP API for the inline editing frontend
//!
//! The browser UI renders pages from `GET /api/settings` and the record
//! endpoints, flips edit mode, and submits edits. Every submitted edit runs
//! through the same [`InlineTextEditor`](crate::editor::InlineTextEditor)
//! pipeline used in-process: detect, translate, persist, refresh.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │               REST API                   │
//! │  GET  /api/health                        │
//! │  GET  /metrics                           │
//! │  GET  /api/settings[/{key}]              │
//! │  PUT  /api/settings/{key}                │
//! │  GET  /api/records/{table}/{id}/{field}  │
//! │  PUT  /api/records/{table}/{id}/{field}  │
//! │  PUT  /api/records/{table}/{id}/image    │
//! │  POST /api/uploads                       │
//! │  GET  /api/edit-mode  POST /api/edit-mode│
//! │  POST /api/translate                     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Callers authenticate with `Authorization: Bearer <token>`; tokens map to
//! actors in [`AuthConfig`](crate::config::AuthConfig). Requests without a
//! known token act as anonymous viewers.

pub mod api;

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderMap};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::editor::{EditorContext, Notifier};
use crate::models::Actor;
use crate::orchestrator::TranslationOrchestrator;
use crate::session::EditModeSession;
use crate::storage::{
    Database, LocalMediaStorage, ObjectStorage, RecordRepository, SettingsStore,
};
use crate::translation::{HttpTranslator, Translator};

pub use api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Config>,

    /// Cached settings, refreshed after each save
    pub settings: Arc<SettingsStore>,

    /// Content records
    pub records: Arc<dyn RecordRepository>,

    /// Process-wide edit mode
    pub edit_mode: Arc<EditModeSession>,

    /// Translation fan-out
    pub orchestrator: Arc<TranslationOrchestrator>,

    /// Image uploads
    pub media: Arc<dyn ObjectStorage>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Assemble state from an open database and a translator
    pub fn new(config: Config, db: &Database, translator: Arc<dyn Translator>) -> Self {
        let settings = Arc::new(SettingsStore::new(
            Arc::new(db.settings()),
            config.server.default_language,
        ));
        let media: Arc<dyn ObjectStorage> =
            Arc::new(LocalMediaStorage::new(config.media.clone()));

        Self {
            settings,
            records: Arc::new(db.records()),
            edit_mode: Arc::new(EditModeSession::new()),
            orchestrator: Arc::new(TranslationOrchestrator::new(translator)),
            media,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Resolve the acting user from the `Authorization` header
    pub fn actor(&self, headers: &HeaderMap) -> Actor {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        self.config.auth.resolve(token)
    }

    /// Editor collaborators for one request
    pub fn editor_context(&self, actor: Actor, notifier: Arc<dyn Notifier>) -> EditorContext {
        EditorContext::new(
            actor,
            Arc::clone(&self.edit_mode),
            Arc::clone(&self.orchestrator),
            Arc::clone(self.settings.repository()),
            Arc::clone(&self.records),
        )
        .with_notifier(notifier)
        .with_refresh(self.settings.clone())
        .with_media(Arc::clone(&self.media))
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server wrapping [`AppState`]
pub struct FrontEditServer {
    state: AppState,
}

impl FrontEditServer {
    /// Open the database, build the HTTP translator and assemble state
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let db = Database::open(&config.database.sqlite_path)
            .map_err(|e| ServerError::InitError(e.to_string()))?;
        let translator = HttpTranslator::new(config.translation.clone())
            .map_err(|e| ServerError::InitError(e.to_string()))?;

        Ok(Self::with_state(AppState::new(config, &db, Arc::new(translator))))
    }

    /// Server over prepared state
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.state.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.state.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    async fn bind(&self) -> Result<tokio::net::TcpListener, ServerError> {
        if let Err(e) = self.state.settings.refresh().await {
            tracing::warn!(error = %e, "Initial settings load failed");
        }

        let addr = &self.state.config.server.bind_address;
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        tracing::info!(address = %self.state.config.server.bind_address, "Starting frontedit server");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        tracing::info!(
            address = %self.state.config.server.bind_address,
            "Starting frontedit server (with graceful shutdown)"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("frontedit server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        let config = &self.state.config;
        ServerInfo {
            bind_address: config.server.bind_address.clone(),
            database: config.database.sqlite_path.display().to_string(),
            translation_endpoint: config.translation.endpoint.clone(),
            cors_enabled: config.server.enable_cors,
            request_logging_enabled: config.server.enable_request_logging,
            tokens: config.auth.tokens.len(),
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: String,
    pub database: String,
    pub translation_endpoint: String,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
    pub tokens: usize,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "frontedit server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Database: {}\n\
             Translation: {}\n\
             Auth Tokens: {}\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.database,
            self.translation_endpoint,
            self.tokens,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}
