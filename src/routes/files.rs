use axum::{
    extract::{Path as UrlPath, Query},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use std::path::{Component, Path};

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::storage::signing;

#[derive(Debug, Deserialize)]
pub struct SignedFileQuery {
    pub expires: i64,
    pub sig: String,
}

/// Serves an uploaded file against a signed, expiring URL. No session is
/// required; the signature is the authorization.
pub async fn serve_file(
    UrlPath(key): UrlPath<String>,
    Query(query): Query<SignedFileQuery>,
) -> Result<impl IntoResponse> {
    let config = get_config();

    if chrono::Utc::now().timestamp() > query.expires {
        return Err(Error::Gone("File URL has expired".to_string()));
    }
    if !signing::verify(&config.file_url_secret, &key, query.expires, &query.sig) {
        return Err(Error::Forbidden("Invalid file signature".to_string()));
    }

    let rel = Path::new(&key);
    if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(Error::BadRequest("Invalid storage key".to_string()));
    }
    let path = Path::new(&config.uploads_dir).join(rel);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound("File not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = content_type_for(&key);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

fn content_type_for(key: &str) -> &'static str {
    match Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
