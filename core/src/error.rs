//! Error taxonomy for content operations.

use crate::types::CategoryId;
use std::fmt;
use thiserror::Error;

/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Every failure a content operation can report.
///
/// Authorization failures are not part of this enum: they are rejected by the
/// HTTP layer before any service is called.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    // ═══════════════════════════════════════════════════════════
    // Caller errors
    // ═══════════════════════════════════════════════════════════

    /// The addressed entity does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Resource label (e.g. `"Category"`)
        resource: &'static str,
        /// Requested id
        id: String,
    },

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// A unique value is already taken.
    #[error("{message}")]
    Conflict {
        /// Offending field, when one can be named
        field: Option<&'static str>,
        /// Human-readable message
        message: String,
    },

    /// The category already holds the maximum number of text banners.
    #[error("category {category_id} already holds the maximum of {limit} text banners")]
    CapacityExceeded {
        /// Full category
        category_id: CategoryId,
        /// Capacity that was hit
        limit: usize,
    },

    /// A row changed rank between read and write. Nothing was written; retrying is safe.
    #[error("rank of {resource} {id} changed concurrently, retry the move")]
    RankConflict {
        /// Resource label
        resource: &'static str,
        /// Id of the entity that was being moved
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Sign-in
    // ═══════════════════════════════════════════════════════════

    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The account exists but is disabled.
    #[error("this account is disabled, contact an administrator")]
    AccountDisabled,

    // ═══════════════════════════════════════════════════════════
    // System errors
    // ═══════════════════════════════════════════════════════════

    /// Persistence failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Media storage failed.
    #[error("media storage error: {0}")]
    Media(String),

    /// Password hashing or verification failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl ContentError {
    /// Build a [`ContentError::NotFound`].
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Build a [`ContentError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a [`ContentError::Conflict`] tied to a field.
    #[must_use]
    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: Some(field),
            message: message.into(),
        }
    }

    /// Build a [`ContentError::Storage`] from any displayable error.
    #[must_use]
    pub fn storage(err: impl fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Returns `true` if the same request may succeed when retried unchanged.
    ///
    /// ```
    /// # use linkboard_core::ContentError;
    /// let err = ContentError::RankConflict { resource: "Category", id: "3".into() };
    /// assert!(err.is_retryable());
    /// assert!(!ContentError::InvalidCredentials.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RankConflict { .. })
    }

    /// Returns `true` if the error was caused by the caller's input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Validation(_)
                | Self::Conflict { .. }
                | Self::CapacityExceeded { .. }
                | Self::InvalidCredentials
                | Self::AccountDisabled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ContentError::not_found("Category", 42);
        assert_eq!(err.to_string(), "Category with id 42 not found");
    }

    #[test]
    fn test_conflict_keeps_field() {
        let err = ContentError::conflict("nickname", "nickname is already in use");
        assert!(matches!(err, ContentError::Conflict { field: Some("nickname"), .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_storage_is_not_user_error() {
        let err = ContentError::storage("connection reset");
        assert!(!err.is_user_error());
        assert_eq!(err.to_string(), "storage error: connection reset");
    }
}
