//! Storage facade: save/retrieve/URL-generation contract consumed by the
//! resume upload flow and the share-link engine. Keys are opaque to every
//! other component.

pub mod local;
pub mod signing;

use async_trait::async_trait;

use crate::error::Result;

pub const DEFAULT_URL_TTL_SECONDS: u64 = 3600;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn generate_key(&self, original_name: &str, candidate_name: Option<String>) -> String;
    /// Content must be durable before this returns Ok.
    async fn save(&self, bytes: &[u8], key: &str, mime_type: &str) -> Result<()>;
    /// Returns a URL the content is retrievable from for at least
    /// `ttl_seconds` (default [`DEFAULT_URL_TTL_SECONDS`]). Generated per
    /// request; callers never cache it.
    async fn resolve_url(&self, key: &str, ttl_seconds: Option<u64>) -> Result<String>;
    /// Best effort: a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Builds a collision-avoiding key: sanitized candidate name (when given)
/// plus millisecond timestamp and a random suffix, keeping the original
/// file extension.
pub fn file_key(original_name: &str, candidate_name: Option<&str>) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix = random_suffix();
    let ext = extension_of(original_name);
    match candidate_name.map(sanitize_candidate_name).filter(|c| !c.is_empty()) {
        Some(clean) => format!("resumes/{}_{}_{}{}", clean, timestamp, suffix, ext),
        None => format!("resumes/{}-{}{}", timestamp, suffix, ext),
    }
}

fn random_suffix() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 4];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

/// Strips everything but alphanumerics and whitespace, collapses whitespace
/// runs to single underscores, and uppercases the result.
pub fn sanitize_candidate_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
