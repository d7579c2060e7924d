//! REST API handlers
//!
//! This module defines the API routes and handlers for the editing frontend.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::editor::{
    EditTarget, EditorError, ImageTarget, InlineImageEditor, InlineTextEditor, MemoryNotifier,
    NotificationLevel,
};
use crate::error::{Error, FrontEditErrorTrait};
use crate::metrics;
use crate::models::{Actor, ContentTable, FieldPrefix, Language, MultilingualValue, SettingEntry};
use crate::orchestrator::TranslationResult;
use crate::storage::StoreError;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub edit_mode: bool,
}

/// One setting resolved for a display language
#[derive(Debug, Serialize)]
pub struct SettingView {
    pub key: String,
    pub language: Language,
    pub text: String,
    pub value: MultilingualValue,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SettingView {
    fn new(entry: SettingEntry, language: Language) -> Self {
        Self {
            text: entry.value.get_or_fallback(language).to_string(),
            key: entry.setting_key,
            language,
            value: entry.value,
            image_url: entry.image_url,
            updated_at: entry.updated_at,
        }
    }
}

/// Record field as stored
#[derive(Debug, Serialize)]
pub struct FieldView {
    pub table: ContentTable,
    pub id: i64,
    pub field: FieldPrefix,
    pub value: MultilingualValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

/// Text edit submitted by the inline editor
#[derive(Debug, Deserialize)]
pub struct SaveTextRequest {
    /// Value the client loaded before editing
    #[serde(default)]
    pub original: MultilingualValue,

    /// Value after editing
    pub current: MultilingualValue,

    /// Optional image written in the same save
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Outcome of a text edit
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: MultilingualValue,
    pub translated_from: Option<Language>,
    pub failed_languages: Vec<Language>,
    pub image_url: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveImageRequest {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct EditModeResponse {
    pub enabled: bool,
    /// Whether the caller may toggle it
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct EditModeRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub source: Option<Language>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.media.max_upload_bytes + 64 * 1024;

    Router::new()
        // Health endpoints
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Settings endpoints
        .route("/api/settings", get(list_settings))
        .route("/api/settings/{key}", get(get_setting).put(save_setting))
        // Record endpoints
        .route("/api/records/{table}/{id}/image", put(save_record_image))
        .route(
            "/api/records/{table}/{id}/{field}",
            get(get_field).put(save_field),
        )
        .route(
            "/api/uploads",
            post(upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Edit mode endpoints
        .route("/api/edit-mode", get(get_edit_mode).post(set_edit_mode))
        // Translation endpoints
        .route("/api/translate", post(translate))
        .with_state(state)
}

// ============================================================================
// Response helpers
// ============================================================================

fn reply<T: Serialize>(endpoint: &'static str, data: T) -> Response {
    metrics::record_api_request(endpoint, StatusCode::OK.as_u16());
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

fn fail(endpoint: &'static str, status: StatusCode, message: impl Into<String>) -> Response {
    metrics::record_api_request(endpoint, status.as_u16());
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidField { .. } | StoreError::Upload(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn editor_status(err: &EditorError) -> StatusCode {
    match err {
        EditorError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        EditorError::EditModeDisabled | EditorError::NotEditing => StatusCode::CONFLICT,
        EditorError::NoImageSelected => StatusCode::BAD_REQUEST,
        EditorError::NoObjectStorage => StatusCode::INTERNAL_SERVER_ERROR,
        EditorError::Store(e) => store_status(e),
    }
}

fn failure(endpoint: &'static str, status: StatusCode, err: Error) -> Response {
    tracing::warn!(
        endpoint,
        category = ?err.category(),
        recoverable = err.is_recoverable(),
        error = %err,
        "Request failed"
    );
    fail(endpoint, status, err.localized_desc())
}

fn store_failure(endpoint: &'static str, err: StoreError) -> Response {
    failure(endpoint, store_status(&err), err.into())
}

fn editor_failure(endpoint: &'static str, err: EditorError) -> Response {
    failure(endpoint, editor_status(&err), err.into())
}

fn request_language(state: &AppState, query: &LanguageQuery) -> Result<Language, String> {
    match &query.lang {
        Some(lang) => lang.parse(),
        None => Ok(state.config.server.default_language),
    }
}

fn parse_record_path(table: &str, field: &str) -> Result<(ContentTable, FieldPrefix), String> {
    let table: ContentTable = table.parse()?;
    let field: FieldPrefix = field.parse()?;
    if table.has_field(field) {
        Ok((table, field))
    } else {
        Err(StoreError::InvalidField { table, field }.to_string())
    }
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Response {
    reply(
        "health",
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            edit_mode: state.edit_mode.is_enabled(),
        },
    )
}

/// Prometheus scrape endpoint
async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather(),
    )
}

// ============================================================================
// Settings Handlers
// ============================================================================

/// All settings resolved for `?lang=`
async fn list_settings(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    const ENDPOINT: &str = "list_settings";

    let language = match request_language(&state, &query) {
        Ok(lang) => lang,
        Err(e) => return fail(ENDPOINT, StatusCode::BAD_REQUEST, e),
    };
    if let Err(e) = state.settings.ensure_loaded().await {
        return store_failure(ENDPOINT, e);
    }

    let views: Vec<SettingView> = state
        .settings
        .entries()
        .into_iter()
        .map(|entry| SettingView::new(entry, language))
        .collect();
    reply(ENDPOINT, views)
}

/// One setting resolved for `?lang=`
async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    const ENDPOINT: &str = "get_setting";

    let language = match request_language(&state, &query) {
        Ok(lang) => lang,
        Err(e) => return fail(ENDPOINT, StatusCode::BAD_REQUEST, e),
    };

    match state.settings.repository().fetch(&key).await {
        Ok(Some(entry)) => reply(ENDPOINT, SettingView::new(entry, language)),
        Ok(None) => fail(
            ENDPOINT,
            StatusCode::NOT_FOUND,
            format!("Setting not found: {key}"),
        ),
        Err(e) => store_failure(ENDPOINT, e),
    }
}

/// Run one text edit through an inline editor
async fn run_text_edit(
    state: &AppState,
    actor: Actor,
    target: EditTarget,
    request: &SaveTextRequest,
) -> Result<SaveResponse, EditorError> {
    let notifier = Arc::new(MemoryNotifier::new());
    let ctx = state.editor_context(actor, notifier.clone());
    if let Some(denied) = ctx.open_denial() {
        return Err(denied);
    }

    let mut editor = InlineTextEditor::new(ctx, target);
    editor.open_with(request.original.clone());
    editor.set_value(request.current.clone());
    if let Some(url) = &request.image_url {
        editor.set_image(url.clone());
    }
    let outcome = editor.save().await?;

    Ok(SaveResponse {
        saved: outcome.value,
        translated_from: outcome.translated_from,
        failed_languages: outcome.failed_languages,
        image_url: outcome.image_url,
        warnings: warnings(&notifier),
    })
}

fn warnings(notifier: &MemoryNotifier) -> Vec<String> {
    notifier
        .take()
        .into_iter()
        .filter(|n| n.level == NotificationLevel::Warning)
        .map(|n| n.message)
        .collect()
}

/// Save a setting's text, and its image when one is given, in one write
async fn save_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SaveTextRequest>,
) -> Response {
    const ENDPOINT: &str = "save_setting";

    match run_text_edit(
        &state,
        state.actor(&headers),
        EditTarget::setting(key),
        &request,
    )
    .await
    {
        Ok(response) => reply(ENDPOINT, response),
        Err(e) => editor_failure(ENDPOINT, e),
    }
}

// ============================================================================
// Record Handlers
// ============================================================================

/// Read one multilingual field of a record
async fn get_field(
    State(state): State<AppState>,
    Path((table, id, field)): Path<(String, i64, String)>,
) -> Response {
    const ENDPOINT: &str = "get_field";

    let (table, field) = match parse_record_path(&table, &field) {
        Ok(parsed) => parsed,
        Err(e) => return fail(ENDPOINT, StatusCode::BAD_REQUEST, e),
    };

    match state.records.get_field(table, id, field).await {
        Ok(Some(value)) => reply(
            ENDPOINT,
            FieldView {
                table,
                id,
                field,
                value,
            },
        ),
        Ok(None) => store_failure(
            ENDPOINT,
            StoreError::NotFound {
                table: table.table_name().to_string(),
                id,
            },
        ),
        Err(e) => store_failure(ENDPOINT, e),
    }
}

/// Save one multilingual field of a record
async fn save_field(
    State(state): State<AppState>,
    Path((table, id, field)): Path<(String, i64, String)>,
    headers: HeaderMap,
    Json(request): Json<SaveTextRequest>,
) -> Response {
    const ENDPOINT: &str = "save_field";

    let (table, field) = match parse_record_path(&table, &field) {
        Ok(parsed) => parsed,
        Err(e) => return fail(ENDPOINT, StatusCode::BAD_REQUEST, e),
    };
    let target = match EditTarget::field(table, id, field) {
        Ok(target) => target,
        Err(e) => return store_failure(ENDPOINT, e),
    };

    match run_text_edit(&state, state.actor(&headers), target, &request).await {
        Ok(response) => reply(ENDPOINT, response),
        Err(e) => editor_failure(ENDPOINT, e),
    }
}

/// Replace a record's image
async fn save_record_image(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(request): Json<SaveImageRequest>,
) -> Response {
    const ENDPOINT: &str = "save_record_image";

    let table: ContentTable = match table.parse() {
        Ok(table) => table,
        Err(e) => return fail(ENDPOINT, StatusCode::BAD_REQUEST, e),
    };

    let ctx = state.editor_context(state.actor(&headers), Arc::new(MemoryNotifier::new()));
    if let Some(denied) = ctx.open_denial() {
        return editor_failure(ENDPOINT, denied);
    }

    let mut editor = InlineImageEditor::new(ctx, ImageTarget::Record { table, id });
    let saved = async {
        editor.open().await?;
        editor.set_url(request.image_url.clone());
        editor.save().await
    }
    .await;

    match saved {
        Ok(image_url) => reply(ENDPOINT, ImageResponse { image_url }),
        Err(e) => editor_failure(ENDPOINT, e),
    }
}

/// Store an uploaded image and return its public URL
///
/// The body is the raw file; the `Content-Type` header names its type.
async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    const ENDPOINT: &str = "upload_image";

    let actor = state.actor(&headers);
    if !actor.can_edit() {
        return editor_failure(ENDPOINT, EditorError::PermissionDenied(actor.id));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match state.media.upload(&body, &query.file_name, content_type).await {
        Ok(image_url) => reply(ENDPOINT, ImageResponse { image_url }),
        Err(e) => store_failure(ENDPOINT, e),
    }
}

// ============================================================================
// Edit Mode Handlers
// ============================================================================

async fn get_edit_mode(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let actor = state.actor(&headers);
    reply(
        "get_edit_mode",
        EditModeResponse {
            enabled: state.edit_mode.is_enabled(),
            available: state.edit_mode.is_available_to(&actor),
        },
    )
}

async fn set_edit_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EditModeRequest>,
) -> Response {
    const ENDPOINT: &str = "set_edit_mode";

    let actor = state.actor(&headers);
    if !state.edit_mode.is_available_to(&actor) {
        return editor_failure(ENDPOINT, EditorError::PermissionDenied(actor.id));
    }

    let enabled = state.edit_mode.set_enabled(&actor, request.enabled);
    reply(
        ENDPOINT,
        EditModeResponse {
            enabled,
            available: true,
        },
    )
}

// ============================================================================
// Translation Handlers
// ============================================================================

/// Translate text into the other three languages without saving
async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TranslateRequest>,
) -> Response {
    const ENDPOINT: &str = "translate";

    let actor = state.actor(&headers);
    if !actor.can_edit() {
        return editor_failure(ENDPOINT, EditorError::PermissionDenied(actor.id));
    }

    let source = request.source.unwrap_or(Language::En);
    let result: TranslationResult = state
        .orchestrator
        .translate_to_other_languages(&request.text, source)
        .await;
    reply(ENDPOINT, result)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert!(response.data.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_error_response() {
        let response = ErrorResponse::new("test error");
        assert!(!response.success);
        assert_eq!(response.error, "test error");
    }

    #[test]
    fn test_parse_record_path() {
        assert_eq!(
            parse_record_path("careers", "requirements"),
            Ok((ContentTable::Careers, FieldPrefix::Requirements))
        );
        assert!(parse_record_path("gallery", "content").is_err());
        assert!(parse_record_path("users", "title").is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            editor_status(&EditorError::EditModeDisabled),
            StatusCode::CONFLICT
        );
        assert_eq!(
            editor_status(&EditorError::Store(StoreError::PermissionDenied {
                actor: "a".into(),
                action: "b".into()
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            store_status(&StoreError::NotFound {
                table: "news".into(),
                id: 1
            }),
            StatusCode::NOT_FOUND
        );
    }
}
