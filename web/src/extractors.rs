//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the id assigned by [`correlation_id_layer`](crate::middleware::correlation_id_layer)
//! - [`SessionUser`]: a verified session cookie, 401 otherwise
//! - [`RequireAdmin`]: a verified admin session, 401/403 otherwise
//! - [`AppJson`], [`AppPath`], [`AppQuery`]: std extractors with JSON error bodies
//!
//! ```ignore
//! async fn handler(RequireAdmin(admin): RequireAdmin, AppPath(id): AppPath<i64>) -> Result<.., AppError> {
//!     tracing::info!(admin = %admin.user_id, id, "admin request");
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use linkboard_auth::{cookie, AuthError, SessionClaims, SessionSigner};
use linkboard_core::Role;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Read from request extensions (set by the middleware), then from the
/// `X-Correlation-ID` header, else a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Claims of the signed-in account.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    Arc<SessionSigner>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let signer = Arc::<SessionSigner>::from_ref(state);
        let token = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| cookie::find_cookie(value, &signer.config().cookie_name))
            .ok_or(AuthError::MissingSession)?;

        let claims = signer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "session rejected");
            e
        })?;
        Ok(Self(claims))
    }
}

/// Claims of a signed-in admin.
///
/// Runs before the handler body, so a non-admin request never reaches storage.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<SessionSigner>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionUser(claims) = SessionUser::from_request_parts(parts, state).await?;
        if let Err(e) = claims.require(Role::Admin) {
            tracing::warn!(user_id = %claims.user_id, "admin route refused");
            return Err(e.into());
        }
        Ok(Self(claims))
    }
}

/// [`axum::Json`] with [`AppError`] rejections.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// [`axum::extract::Path`] with [`AppError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// [`axum::extract::Query`] with [`AppError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
