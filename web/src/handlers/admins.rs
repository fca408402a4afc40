//! Admin account management.

use super::Ack;
use crate::error::AppError;
use crate::extractors::{AppJson, AppPath, RequireAdmin};
use crate::state::{AppState, Backend};
use axum::{extract::State, http::StatusCode, Json};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::accounts::{self, Registration};
use linkboard_core::{Account, AccountId};
use serde::Deserialize;

/// Admin accounts, oldest first.
pub async fn list_admins<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Account>>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Ok(Json(accounts::list_admins(&*state.backend).await?))
}

/// Create another admin.
pub async fn create_admin<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(registration): AppJson<Registration>,
) -> Result<(StatusCode, Json<Account>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let account = accounts::create_admin(&*state.backend, &*state.hasher, &registration).await?;
    tracing::info!(by = %admin.user_id, id = %account.id, "admin created");
    Ok((StatusCode::CREATED, Json(account)))
}

/// Nickname change.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// New nickname
    #[serde(default)]
    pub nickname: String,
}

/// Rename an admin. The nickname must be unused by every other account.
pub async fn rename_admin<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(request): AppJson<RenameRequest>,
) -> Result<Json<Account>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Ok(Json(accounts::rename_admin(&*state.backend, AccountId(id), &request.nickname).await?))
}

/// Delete another admin. At least one admin always remains.
pub async fn delete_admin<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Ack>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    accounts::remove_admin(&*state.backend, admin.user_id, AccountId(id)).await?;
    Ok(Json(Ack::OK))
}
