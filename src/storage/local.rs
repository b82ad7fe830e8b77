use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};

use super::{signing, StorageBackend, DEFAULT_URL_TTL_SECONDS};

/// Local-disk driver. Files land under `root`; retrieval URLs point back at
/// this backend's signed `/files/{key}` route.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
    secret: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            secret: secret.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::BadRequest("Invalid storage key".to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    fn generate_key(&self, original_name: &str, candidate_name: Option<String>) -> String {
        super::file_key(original_name, candidate_name.as_deref())
    }

    async fn save(&self, bytes: &[u8], key: &str, _mime_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        // Durable before acknowledging.
        file.sync_all().await?;
        Ok(())
    }

    async fn resolve_url(&self, key: &str, ttl_seconds: Option<u64>) -> Result<String> {
        self.path_for(key)?;
        let ttl = ttl_seconds.unwrap_or(DEFAULT_URL_TTL_SECONDS);
        let expires_at = chrono::Utc::now().timestamp() + ttl as i64;
        let signature = signing::signature_for(&self.secret, key, expires_at);
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join(&format!("files/{}", key)))
            .map_err(|e| Error::Config(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("expires", &expires_at.to_string())
            .append_pair("sig", &signature);
        Ok(url.to_string())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        let dir = std::env::temp_dir().join(format!("rms-storage-{}", uuid::Uuid::new_v4()));
        LocalStorage::new(dir, "http://localhost:8080", "test-secret")
    }

    #[tokio::test]
    async fn save_then_delete_roundtrip() {
        let storage = temp_storage();
        let key = storage.generate_key("cv.pdf", Some("Jane Doe".to_string()));
        storage.save(b"content", &key, "application/pdf").await.unwrap();
        let on_disk = storage.path_for(&key).unwrap();
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"content");
        storage.delete(&key).await.unwrap();
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn delete_of_absent_key_is_not_an_error() {
        let storage = temp_storage();
        storage.delete("resumes/never-saved.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let storage = temp_storage();
        assert!(storage.save(b"x", "../outside.pdf", "application/pdf").await.is_err());
        assert!(storage.resolve_url("/etc/passwd", None).await.is_err());
    }

    #[tokio::test]
    async fn resolved_url_is_signed_and_expiring() {
        let storage = temp_storage();
        let url = storage.resolve_url("resumes/a.pdf", Some(60)).await.unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/files/resumes/a.pdf");
        let expires: i64 = parsed
            .query_pairs()
            .find(|(k, _)| k == "expires")
            .unwrap()
            .1
            .parse()
            .unwrap();
        let sig = parsed
            .query_pairs()
            .find(|(k, _)| k == "sig")
            .unwrap()
            .1
            .to_string();
        assert!(expires >= chrono::Utc::now().timestamp() + 59);
        assert!(signing::verify("test-secret", "resumes/a.pdf", expires, &sig));
    }
}
