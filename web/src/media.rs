//! Filesystem media storage.

use linkboard_core::providers::{is_clean_media_path, MediaStorage};
use linkboard_core::{ContentError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Stores uploads as files below a root directory.
///
/// Files are served by the router under `base_url`, so `public_url` is
/// `base_url` joined with the relative path.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    /// Storage rooted at `root`, served under `base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if !is_clean_media_path(path) {
            tracing::warn!(%path, "rejected media path");
            return Err(ContentError::Media(format!("invalid media path: {path}")));
        }
        Ok(self.root.join(path))
    }
}

impl MediaStorage for LocalMediaStorage {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str, overwrite: bool) -> Result<()> {
        let target = self.resolve(path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ContentError::Media(format!("Failed to create {}: {e}", parent.display())))?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&target).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ContentError::Media(format!("{path} already exists")),
            _ => ContentError::Media(format!("Failed to open {path}: {e}")),
        })?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ContentError::Media(format!("Failed to write {path}: {e}")))?;
        file.flush()
            .await
            .map_err(|e| ContentError::Media(format!("Failed to write {path}: {e}")))?;

        tracing::debug!("media stored");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("media already absent");
                Ok(())
            }
            Err(e) => Err(ContentError::Media(format!("Failed to remove {path}: {e}"))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn storage() -> (tempfile::TempDir, LocalMediaStorage) {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalMediaStorage::new(dir.path(), "/media/");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_creates_directories() {
        let (dir, storage) = storage();
        storage
            .put("avatars/3/profile.png", vec![1, 2, 3], "image/png", false)
            .await
            .expect("put");

        let written = std::fs::read(dir.path().join("avatars/3/profile.png")).expect("read back");
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_put_respects_overwrite_flag() {
        let (dir, storage) = storage();
        storage.put("a/b.png", vec![1], "image/png", false).await.expect("first");

        let err = storage.put("a/b.png", vec![2], "image/png", false).await;
        assert!(matches!(err, Err(ContentError::Media(_))));

        storage.put("a/b.png", vec![3], "image/png", true).await.expect("overwrite");
        assert_eq!(std::fs::read(dir.path().join("a/b.png")).expect("read"), vec![3]);
    }

    #[tokio::test]
    async fn test_escaping_paths_are_rejected() {
        let (_dir, storage) = storage();
        for path in ["../outside.png", "/etc/passwd", "a/../../b", ""] {
            assert!(storage.put(path, vec![1], "image/png", true).await.is_err(), "{path}");
        }
    }

    #[tokio::test]
    async fn test_remove_missing_file_succeeds() {
        let (_dir, storage) = storage();
        storage.remove("common-banners/none.jpg").await.expect("remove");
    }

    #[test]
    fn test_public_url() {
        let (_dir, storage) = storage();
        assert_eq!(storage.public_url("common-banners/x.png"), "/media/common-banners/x.png");
    }
}
