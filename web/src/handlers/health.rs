//! Liveness and readiness probes.

use crate::state::{AppState, Backend};
use axum::{extract::State, http::StatusCode, Json};
use linkboard_core::providers::MediaStorage;
use serde::{Deserialize, Serialize};

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Liveness check. Does not touch the database.
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness
    pub ready: bool,
    /// Database reachable
    pub database: bool,
}

/// Readiness check: 200 if the database answers, 503 otherwise.
///
/// ```text
/// GET /ready
/// {"ready":true,"database":true}
/// ```
pub async fn readiness_check<B, M>(State(state): State<AppState<B, M>>) -> (StatusCode, Json<ReadinessResponse>)
where
    B: Backend,
    M: MediaStorage + 'static,
{
    match state.backend.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                database: true,
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    ready: false,
                    database: false,
                }),
            )
        }
    }
}
