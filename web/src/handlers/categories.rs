//! Text banner category administration.

use super::{Ack, ReorderRequest, ReorderResponse};
use crate::error::AppError;
use crate::extractors::{AppJson, AppPath, RequireAdmin};
use crate::state::{AppState, Backend};
use axum::{extract::State, http::StatusCode, Json};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::{catalog, reorder};
use linkboard_core::{Category, CategoryDraft, CategoryId};

/// All categories in rank order.
pub async fn list_categories<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Category>>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Ok(Json(catalog::list_categories(&*state.backend).await?))
}

/// Create a category at the end of the ordering.
///
/// ```text
/// POST /api/admin/text-banner-categories
/// {"code": "news", "name": "News"}
/// ```
pub async fn create_category<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(draft): AppJson<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let category = catalog::create_category(&*state.backend, &draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Edit code and name.
pub async fn update_category<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(draft): AppJson<CategoryDraft>,
) -> Result<Json<Category>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Ok(Json(catalog::update_category(&*state.backend, CategoryId(id), &draft).await?))
}

/// Delete a category with its text banners.
pub async fn delete_category<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Ack>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    catalog::delete_category(&*state.backend, CategoryId(id)).await?;
    tracing::info!(admin = %admin.user_id, id, "category deleted");
    Ok(Json(Ack::OK))
}

/// Move a category one position up or down.
///
/// ```text
/// PUT /api/admin/text-banner-categories/7/reorder
/// {"direction": "up"}
/// ```
///
/// The first category moved up (or the last moved down) answers
/// `{"ok": true, "moved": false}` without writing. A concurrent move of
/// either row answers `409 RANK_CONFLICT` and may be retried.
pub async fn reorder_category<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(request): AppJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let outcome = reorder::reorder::<Category, B>(&*state.backend, CategoryId(id), request.direction).await?;
    Ok(Json(ReorderResponse {
        ok: true,
        moved: outcome.moved(),
    }))
}
