//! In-memory media storage.

use linkboard_core::providers::{is_clean_media_path, MediaStorage};
use linkboard_core::{ContentError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Files {
    files: HashMap<String, (String, Vec<u8>)>,
    fail_puts: bool,
    fail_removes: bool,
}

/// Media storage backed by a map of path to `(content type, bytes)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMedia {
    files: Arc<Mutex<Files>>,
}

impl InMemoryMedia {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if a file is stored at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().is_ok_and(|f| f.files.contains_key(path))
    }

    /// Stored paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .lock()
            .map(|f| f.files.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    /// Content of the file at `path`.
    #[must_use]
    pub fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .ok()
            .and_then(|f| f.files.get(path).map(|(_, bytes)| bytes.clone()))
    }

    /// Make every following `put` fail.
    pub fn fail_puts(&self, fail: bool) {
        if let Ok(mut files) = self.files.lock() {
            files.fail_puts = fail;
        }
    }

    /// Make every following `remove` fail.
    pub fn fail_removes(&self, fail: bool) {
        if let Ok(mut files) = self.files.lock() {
            files.fail_removes = fail;
        }
    }
}

impl MediaStorage for InMemoryMedia {
    fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        let files = Arc::clone(&self.files);
        let path = path.to_string();
        let content_type = content_type.to_string();

        async move {
            if !is_clean_media_path(&path) {
                return Err(ContentError::Media(format!("invalid media path: {path}")));
            }
            let mut files = files
                .lock()
                .map_err(|_| ContentError::Media("media lock poisoned".to_string()))?;
            if files.fail_puts {
                return Err(ContentError::Media("injected upload failure".to_string()));
            }
            if !overwrite && files.files.contains_key(&path) {
                return Err(ContentError::Media(format!("{path} already exists")));
            }
            files.files.insert(path, (content_type, bytes));
            Ok(())
        }
    }

    fn remove(&self, path: &str) -> impl Future<Output = Result<()>> + Send {
        let files = Arc::clone(&self.files);
        let path = path.to_string();

        async move {
            let mut files = files
                .lock()
                .map_err(|_| ContentError::Media("media lock poisoned".to_string()))?;
            if files.fail_removes {
                return Err(ContentError::Media("injected removal failure".to_string()));
            }
            files.files.remove(&path);
            Ok(())
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("/media/{path}")
    }
}
