//! HTTP surface of linkboard.
//!
//! Handlers are a thin shell around `linkboard_core::services`: they extract
//! and authorize the request, call one service, and map the result to JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP shell (Axum)               │  ← extractors, cookies, multipart
//! │  - session + role checks                │  ← rejected before any read
//! │  - AppError → JSON                      │  ← tracing, metrics
//! ├─────────────────────────────────────────┤
//! │         linkboard-core services         │  ← validation, ordering rules
//! ├─────────────────────────────────────────┤
//! │  PostgresStore  │ LocalMediaStorage     │  ← provider implementations
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. [`correlation_id_layer`] opens the `http_request` span
//! 2. [`RequireAdmin`](extractors::RequireAdmin) / [`SessionUser`](extractors::SessionUser) verify the cookie
//! 3. The handler calls a service with the state's providers
//! 4. [`AppError`] renders failures with a stable `code`
//!
//! # Example
//!
//! ```ignore
//! use linkboard_web::{router, AppState, LocalMediaStorage};
//!
//! let state = AppState::new(store, Arc::new(LocalMediaStorage::new("./media", "/media")), hasher, sessions);
//! let app = router::router(state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use extractors::{CorrelationId, RequireAdmin, SessionUser};
pub use media::LocalMediaStorage;
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use state::{AppState, Backend};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
