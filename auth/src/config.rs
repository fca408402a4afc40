//! Session configuration.

use chrono::Duration;
use std::fmt;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// `SameSite` cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Strict (same-site only).
    Strict,
    /// Lax (cross-site top-level GET allowed).
    Lax,
    /// None (cross-site allowed, requires Secure).
    None,
}

impl SameSitePolicy {
    /// Attribute value as written in `Set-Cookie`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Session cookie and token settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC signing secret.
    pub secret: Vec<u8>,

    /// Session lifetime.
    ///
    /// Default: 7 days
    pub ttl: Duration,

    /// Cookie name.
    ///
    /// Default: `linkboard_session`
    pub cookie_name: String,

    /// Send the cookie over HTTPS only.
    ///
    /// Default: `false`
    pub secure: bool,

    /// `SameSite` policy.
    ///
    /// Default: [`SameSitePolicy::Lax`]
    pub same_site: SameSitePolicy,
}

impl SessionConfig {
    /// Configuration signing with `secret` and default settings.
    #[must_use]
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            ttl: Duration::days(7),
            cookie_name: "linkboard_session".to_string(),
            secure: false,
            same_site: SameSitePolicy::Lax,
        }
    }

    /// Set session lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Mark the cookie `Secure`.
    #[must_use]
    pub const fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set `SameSite` policy.
    #[must_use]
    pub const fn with_same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site;
        self
    }

    /// Lifetime in whole seconds, as used for `Max-Age`.
    #[must_use]
    pub fn max_age_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("cookie_name", &self.cookie_name)
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}
