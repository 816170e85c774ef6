//! Photo storage

use crate::config::MediaConfig;
use crate::{EstateError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` and return the public URL of the stored file
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Content-addressed photos on the local filesystem.
///
/// Files are named `<sha256 hex>.<ext>`, so uploading the same photo twice
/// yields the same URL and a single file.
pub struct LocalMediaStore {
    dir: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl LocalMediaStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
            max_bytes: MediaConfig::default().max_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            base_url: config.base_url.clone(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Stored name for `bytes` uploaded as `file_name`
pub fn content_name(file_name: &str, bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    match extension(file_name) {
        Some(ext) => format!("{}.{}", digest, ext),
        None => digest,
    }
}

fn extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(EstateError::Media(format!("{} is empty", file_name)));
        }
        if bytes.len() > self.max_bytes {
            return Err(EstateError::Media(format!(
                "{} is {} bytes, limit is {}",
                file_name,
                bytes.len(),
                self.max_bytes
            )));
        }

        let name = content_name(file_name, bytes);
        let path = self.dir.join(&name);
        if tokio::fs::try_exists(&path).await? {
            log::debug!("Photo {} already stored", name);
        } else {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, bytes).await?;
            log::info!("Stored photo {} ({} bytes)", name, bytes.len());
        }

        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_name() {
        let name = content_name("Living Room.JPG", b"abc");
        assert_eq!(
            name,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg"
        );
        assert!(!content_name("no-extension", b"abc").contains('.'));
        assert!(!content_name("weird.j p g", b"abc").contains('.'));
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path(), "https://cdn.example.com/media/");

        let first = store.store("front.png", b"pixels").await.unwrap();
        let second = store.store("copy.png", b"pixels").await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("https://cdn.example.com/media/"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            base_url: "/media".into(),
            max_bytes: 4,
        };
        let store = LocalMediaStore::from_config(&config);
        assert!(matches!(store.store("a.jpg", b"").await, Err(EstateError::Media(_))));
        assert!(matches!(store.store("a.jpg", b"12345").await, Err(EstateError::Media(_))));
    }
}
