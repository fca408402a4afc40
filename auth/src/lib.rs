//! # Linkboard Auth
//!
//! Credentials and sessions for linkboard.
//!
//! - [`Argon2Hasher`]: the production [`PasswordHasher`](linkboard_core::providers::PasswordHasher)
//! - [`SessionSigner`]: issues and verifies HMAC-SHA256 signed session tokens
//! - [`cookie`]: `Set-Cookie` rendering and `Cookie` header parsing
//!
//! Sessions are stateless: the token carries its claims and expiry, and the
//! signature is the only thing the server checks.
//!
//! ```text
//! token = base64url(json claims) "." base64url(hmac_sha256(secret, first part))
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use linkboard_auth::{SessionConfig, SessionSigner};
//! use linkboard_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! let config = SessionConfig::new(b"a secret of at least thirty-two bytes!".to_vec())
//!     .with_cookie_name("linkboard_session");
//! let signer = SessionSigner::new(config, Arc::new(SystemClock))?;
//! # Ok::<(), linkboard_auth::AuthError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod cookie;
pub mod error;
pub mod password;
pub mod session;

pub use config::{SameSitePolicy, SessionConfig};
pub use error::{AuthError, Result};
pub use password::Argon2Hasher;
pub use session::{SessionClaims, SessionSigner};
