//! Media (image file) storage.

use crate::error::Result;

/// Stores uploaded images under relative paths such as
/// `common-banners/<uuid>.png` or `avatars/7/profile.jpg`.
pub trait MediaStorage: Send + Sync {
    /// Store `bytes` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Media`](crate::ContentError::Media) if:
    /// - `path` is not a clean relative path
    /// - The file exists and `overwrite` is `false`
    /// - The write fails
    fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove the file at `path`. Removing a missing file succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Media`](crate::ContentError::Media) if removal fails.
    fn remove(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Public URL under which `path` is served.
    fn public_url(&self, path: &str) -> String;
}

/// `true` if `path` is a non-empty relative path made of plain segments
/// (no `.` / `..` segments, no leading slash, no backslashes).
///
/// ```
/// use linkboard_core::providers::is_clean_media_path;
///
/// assert!(is_clean_media_path("avatars/3/profile.png"));
/// assert!(!is_clean_media_path("../secret"));
/// assert!(!is_clean_media_path("/etc/passwd"));
/// ```
#[must_use]
pub fn is_clean_media_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
