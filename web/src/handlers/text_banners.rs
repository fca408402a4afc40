//! Text banner administration.

use super::{Ack, ReorderRequest, ReorderResponse};
use crate::error::AppError;
use crate::extractors::{AppJson, AppPath, AppQuery, RequireAdmin};
use crate::state::{AppState, Backend};
use axum::{extract::State, http::StatusCode, Json};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::{catalog, reorder};
use linkboard_core::{BannerDetails, CategoryId, TextBanner, TextBannerDraft, TextBannerId};
use serde::Deserialize;

/// Listing filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Restrict to one category
    pub category_id: Option<i64>,
}

/// Text banners, optionally of one category (`?categoryId=3`).
pub async fn list_text_banners<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<TextBanner>>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let banners = catalog::list_text_banners(&*state.backend, query.category_id.map(CategoryId)).await?;
    Ok(Json(banners))
}

/// New text banner form.
#[derive(Debug, Deserialize)]
pub struct CreateTextBanner {
    /// Owning category
    pub category_id: i64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Target link
    #[serde(default)]
    pub link: String,
}

/// Append a text banner to a category.
///
/// `400` when the category already holds the maximum number of banners,
/// `404` when it does not exist.
pub async fn create_text_banner<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(request): AppJson<CreateTextBanner>,
) -> Result<(StatusCode, Json<TextBanner>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let draft = TextBannerDraft {
        category_id: CategoryId(request.category_id),
        name: request.name,
        link: request.link,
        created_by: Some(admin.user_id),
    };
    let banner = catalog::create_text_banner(&*state.backend, &draft).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// Edit name and link.
pub async fn update_text_banner<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(details): AppJson<BannerDetails>,
) -> Result<Json<TextBanner>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Ok(Json(catalog::update_text_banner(&*state.backend, TextBannerId(id), &details).await?))
}

/// Delete a text banner.
pub async fn delete_text_banner<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Ack>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    catalog::delete_text_banner(&*state.backend, TextBannerId(id)).await?;
    Ok(Json(Ack::OK))
}

/// Move a text banner one position within its category.
pub async fn reorder_text_banner<B, M>(
    State(state): State<AppState<B, M>>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(request): AppJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let outcome = reorder::reorder::<TextBanner, B>(&*state.backend, TextBannerId(id), request.direction).await?;
    Ok(Json(ReorderResponse {
        ok: true,
        moved: outcome.moved(),
    }))
}
