//! Registration, sign-in and session handlers.
//!
//! Sessions are stateless signed cookies: sign-in sets one, sign-out clears
//! it, and every other route verifies it through
//! [`SessionUser`](crate::extractors::SessionUser).

use super::Ack;
use crate::error::AppError;
use crate::extractors::{AppJson, AppQuery, SessionUser};
use crate::state::{AppState, Backend};
use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    Json,
};
use linkboard_auth::{cookie, SessionClaims, SessionSigner};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::accounts::{self, Registration};
use linkboard_core::Account;
use serde::{Deserialize, Serialize};

/// `Set-Cookie` header carrying a fresh session for `account`.
pub(crate) fn session_header(signer: &SessionSigner, account: &Account) -> Result<[(HeaderName, String); 1], AppError> {
    let token = signer.issue(account)?;
    Ok([(header::SET_COOKIE, cookie::session_cookie(signer.config(), &token))])
}

/// Register a member account.
///
/// ```text
/// POST /api/auth/register
/// {"username": "kim", "nickname": "Kim", "password": "secret123"}
/// ```
///
/// Responds `201 {"ok": true}`, or `409` with `field` naming the taken value.
pub async fn register<B, M>(
    State(state): State<AppState<B, M>>,
    AppJson(registration): AppJson<Registration>,
) -> Result<(StatusCode, Json<Ack>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    accounts::register_member(&*state.backend, &*state.hasher, &registration).await?;
    Ok((StatusCode::CREATED, Json(Ack::OK)))
}

/// Query of the availability check. One of the two is expected.
#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    /// Username to check
    pub username: Option<String>,
    /// Nickname to check
    pub nickname: Option<String>,
}

/// Availability check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Whether the value is in use
    pub taken: bool,
}

/// Whether a username or nickname is already in use.
///
/// ```text
/// GET /api/auth/check-username?username=kim
/// {"taken": false}
/// ```
///
/// With neither parameter the answer is `taken: false`.
pub async fn check_username<B, M>(
    State(state): State<AppState<B, M>>,
    AppQuery(query): AppQuery<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let taken = if let Some(username) = query.username.filter(|u| !u.trim().is_empty()) {
        accounts::username_taken(&*state.backend, &username).await?
    } else if let Some(nickname) = query.nickname.filter(|n| !n.trim().is_empty()) {
        accounts::nickname_taken(&*state.backend, &nickname).await?
    } else {
        false
    };
    Ok(Json(CheckResponse { taken }))
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    #[serde(default)]
    pub username: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

/// Sign in and set the session cookie.
///
/// - `401` for an unknown username or wrong password
/// - `403` for a disabled account
pub async fn login<B, M>(
    State(state): State<AppState<B, M>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<([(HeaderName, String); 1], Json<Ack>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let account = accounts::authenticate(&*state.backend, &*state.hasher, &request.username, &request.password).await?;
    let headers = session_header(&state.sessions, &account)?;

    tracing::info!(user_id = %account.id, role = %account.role, "signed in");
    metrics::counter!("linkboard_sign_ins_total", "role" => account.role.as_str()).increment(1);
    Ok((headers, Json(Ack::OK)))
}

/// Clear the session cookie. Succeeds without a session.
#[allow(clippy::unused_async)]
pub async fn logout<B, M>(State(state): State<AppState<B, M>>) -> ([(HeaderName, String); 1], Json<Ack>)
where
    B: Backend,
    M: MediaStorage + 'static,
{
    (
        [(header::SET_COOKIE, cookie::clear_cookie(state.sessions.config()))],
        Json(Ack::OK),
    )
}

/// Claims of the current session, `401` without one.
#[allow(clippy::unused_async)]
pub async fn session(SessionUser(claims): SessionUser) -> Json<SessionClaims> {
    Json(claims)
}
