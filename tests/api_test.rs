//! HTTP API tests driven through the router without a socket

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::admin_actor;
use frontedit::config::{AuthToken, Config};
use frontedit::models::{ContentTable, Role};
use frontedit::server::{create_router, AppState};
use frontedit::storage::{Database, RecordRepository, SettingsRepository};
use frontedit::translation::{MockMode, MockTranslator};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const EDITOR_TOKEN: &str = "editor-token";
const VIEWER_TOKEN: &str = "viewer-token";

struct TestApp {
    router: Router,
    state: AppState,
    db: Database,
    mock: Arc<MockTranslator>,
    _uploads: TempDir,
}

fn app(mode: MockMode) -> TestApp {
    let uploads = TempDir::new().unwrap();
    let mut config = Config::default();
    config.media.upload_dir = uploads.path().to_path_buf();
    config.auth.tokens.insert(
        EDITOR_TOKEN.to_string(),
        AuthToken {
            user_id: "editor-1".to_string(),
            role: Role::Editor,
        },
    );
    config.auth.tokens.insert(
        VIEWER_TOKEN.to_string(),
        AuthToken {
            user_id: "viewer-1".to_string(),
            role: Role::Viewer,
        },
    );

    let db = Database::in_memory().unwrap();
    let mock = Arc::new(MockTranslator::new(mode));
    let state = AppState::new(config, &db, mock.clone());

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        mock,
        _uploads: uploads,
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn enable_edit_mode(app: &TestApp) {
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/edit-mode",
            Some(EDITOR_TOKEN),
            json!({ "enabled": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app = app(MockMode::Suffix);
    let (status, body) = send(&app.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["edit_mode"], false);
}

#[tokio::test]
async fn test_viewer_cannot_save() {
    let app = app(MockMode::Suffix);
    app.state.edit_mode.set_enabled(&admin_actor(), true);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/settings/hero_title",
            Some(VIEWER_TOKEN),
            json!({ "current": { "en": "Hi", "la": "", "th": "", "zh": "" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn test_viewer_cannot_toggle_edit_mode() {
    let app = app(MockMode::Suffix);
    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/api/edit-mode", None, json!({ "enabled": true })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!app.state.edit_mode.is_enabled());
}

#[tokio::test]
async fn test_save_requires_edit_mode() {
    let app = app(MockMode::Suffix);
    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/settings/hero_title",
            Some(EDITOR_TOKEN),
            json!({ "current": { "en": "Hi", "la": "", "th": "", "zh": "" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_save_setting_translates_and_refreshes() {
    let app = app(MockMode::Suffix);
    enable_edit_mode(&app).await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/settings/hero_title",
            Some(EDITOR_TOKEN),
            json!({
                "original": { "en": "", "la": "", "th": "", "zh": "" },
                "current": { "en": "Building the future", "la": "", "th": "", "zh": "" }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["translated_from"], "en");
    assert_eq!(body["data"]["saved"]["th"], "Building the future_th");
    assert_eq!(app.mock.call_count(), 3);

    // The settings cache was refreshed by the save.
    assert_eq!(
        app.state.settings.get_for("hero_title", frontedit::Language::Zh),
        "Building the future_zh"
    );

    let (status, body) = send(&app.router, get("/api/settings/hero_title?lang=la")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Building the future_la");
}

#[tokio::test]
async fn test_save_setting_with_image() {
    let app = app(MockMode::Suffix);
    enable_edit_mode(&app).await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/settings/hero_banner",
            Some(EDITOR_TOKEN),
            json!({
                "current": { "en": "Port logistics", "la": "", "th": "", "zh": "" },
                "image_url": "/uploads/port.jpg"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image_url"], "/uploads/port.jpg");
    assert_eq!(body["data"]["saved"]["zh"], "Port logistics_zh");

    let stored = app
        .db
        .settings()
        .fetch("hero_banner")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.value.en, "Port logistics");
    assert_eq!(stored.image_url.as_deref(), Some("/uploads/port.jpg"));
    assert_eq!(
        app.state.settings.get_image("hero_banner").as_deref(),
        Some("/uploads/port.jpg")
    );
}

#[tokio::test]
async fn test_partial_failure_is_reported_as_warning() {
    let app = app(MockMode::FailFor(
        [frontedit::Language::Zh].into_iter().collect(),
    ));
    enable_edit_mode(&app).await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/settings/about_intro",
            Some(EDITOR_TOKEN),
            json!({ "current": { "en": "About us", "la": "", "th": "", "zh": "" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["failed_languages"], json!(["zh"]));
    assert_eq!(body["data"]["saved"]["zh"], "");
    assert_eq!(body["data"]["warnings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_field_is_bad_request() {
    let app = app(MockMode::Suffix);
    let (status, _) = send(&app.router, get("/api/records/gallery/1/content")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, get("/api/records/users/1/title")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app = app(MockMode::Suffix);
    enable_edit_mode(&app).await;

    let (status, _) = send(&app.router, get("/api/records/news/999/title")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/records/news/999/title",
            Some(EDITOR_TOKEN),
            json!({ "current": { "en": "Hello", "la": "ສະບາຍດີ", "th": "", "zh": "" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_record_field_and_image() {
    let app = app(MockMode::Suffix);
    enable_edit_mode(&app).await;
    let id = app
        .db
        .records()
        .create_record(&admin_actor(), ContentTable::Projects)
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/records/projects/{id}/description"),
            Some(EDITOR_TOKEN),
            json!({ "current": { "en": "", "la": "", "th": "สะพาน", "zh": "" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["translated_from"], "th");
    assert_eq!(body["data"]["saved"]["en"], "สะพาน_en");

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/records/projects/{id}/image"),
            Some(EDITOR_TOKEN),
            json!({ "image_url": "/uploads/bridge.jpg" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image_url"], "/uploads/bridge.jpg");

    let (_, body) = send(
        &app.router,
        get(&format!("/api/records/projects/{id}/description")),
    )
    .await;
    assert_eq!(body["data"]["value"]["th"], "สะพาน");
}

#[tokio::test]
async fn test_upload_image() {
    let app = app(MockMode::Suffix);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/uploads?file_name=logo.png")
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::AUTHORIZATION, format!("Bearer {EDITOR_TOKEN}"))
        .body(Body::from(vec![0x89, b'P', b'N', b'G']))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["image_url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("logo.png"));
}

#[tokio::test]
async fn test_translate_endpoint() {
    let app = app(MockMode::Suffix);
    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/translate",
            Some(EDITOR_TOKEN),
            json!({ "text": "Welcome" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["translations"]["la"], "Welcome_la");
}
