//! Error types for sessions and authorization.

use linkboard_core::Role;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of session handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// No session cookie on the request.
    #[error("authentication required")]
    MissingSession,

    /// The token is malformed or its signature does not match.
    #[error("invalid session token")]
    InvalidToken,

    /// The token was valid but has expired.
    #[error("session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// The session's role is not sufficient.
    #[error("insufficient permissions: {required} role required")]
    InsufficientRole {
        /// Role the operation requires
        required: Role,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Invalid session configuration.
    #[error("session configuration error: {0}")]
    Configuration(String),

    /// Claims could not be encoded.
    #[error("session encoding error: {0}")]
    Encoding(String),
}

impl AuthError {
    /// `true` if the client must sign in (again).
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(self, Self::MissingSession | Self::InvalidToken | Self::SessionExpired)
    }
}
