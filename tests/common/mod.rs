#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use rms_backend::middleware::auth::issue_token;
use rms_backend::models::user::{Role, User};
use rms_backend::storage::local::LocalStorage;
use rms_backend::storage::StorageBackend;
use rms_backend::store::memory::MemoryStore;
use rms_backend::store::{NewUser, UserStore};
use rms_backend::utils::crypto::hash_password;
use rms_backend::{routes, AppState};

pub const TEST_PASSWORD: &str = "correct-horse";
pub const FILE_SECRET: &str = "test-file-secret";
pub const BASE_URL: &str = "http://localhost:8080";

static UPLOADS: OnceLock<PathBuf> = OnceLock::new();

pub fn uploads_root() -> PathBuf {
    UPLOADS
        .get_or_init(|| std::env::temp_dir().join(format!("rms-tests-{}", uuid::Uuid::new_v4())))
        .clone()
}

pub fn init_test_config() {
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("DATABASE_URL", "postgres://localhost/unused_in_tests");
    std::env::set_var("JWT_SECRET", "test_secret_key");
    std::env::set_var("APP_BASE_URL", BASE_URL);
    std::env::set_var("UPLOADS_DIR", uploads_root().to_str().unwrap());
    std::env::set_var("FILE_URL_SECRET", FILE_SECRET);
    std::env::set_var("API_RPS", "1000");
    std::env::set_var("PUBLIC_RPS", "1000");
    // Later tests in the same binary hit the already-initialized path.
    let _ = rms_backend::config::init_config();
}

/// Full router wired against the in-memory store; no database involved.
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    init_test_config();
    let store = Arc::new(MemoryStore::new());
    let storage: Arc<dyn StorageBackend> =
        Arc::new(LocalStorage::new(uploads_root(), BASE_URL, FILE_SECRET));
    let state = AppState::with_parts(store.clone(), store.clone(), store.clone(), storage);
    (routes::router(state, 1000, 1000), store)
}

pub async fn seed_user(store: &MemoryStore, username: &str, role: Role) -> User {
    UserStore::insert(
        store,
        NewUser {
            username: username.to_string(),
            full_name: Some(format!("{} Person", username)),
            phone: None,
            role,
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
        },
    )
    .await
    .unwrap()
}

pub fn bearer(user: &User) -> String {
    format!("Bearer {}", issue_token(user).unwrap())
}

/// Fires a JSON request at the router and returns status plus parsed body.
/// Non-JSON bodies come back as `Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

pub const BOUNDARY: &str = "X-RMS-TEST-BOUNDARY";

/// Hand-built multipart/form-data body: text fields plus an optional
/// `file` part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn upload_resume(
    app: &Router,
    auth: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> (StatusCode, JsonValue) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/resumes")
        .header(header::AUTHORIZATION, auth)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}
