//! Public read-only pages. No session required.

use super::image_banners::ImageBannerView;
use crate::error::AppError;
use crate::state::{AppState, Backend};
use axum::{extract::State, Json};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::catalog::{self, CategoryLinks};
use linkboard_core::services::banners;
use linkboard_core::{ImageBannerKind, COMMON_BANNER_SLOTS};
use serde::Serialize;

/// The links page.
#[derive(Debug, Serialize)]
pub struct LinksResponse {
    /// Categories in rank order, each with its banners in rank order
    pub categories: Vec<CategoryLinks>,
    /// Randomly chosen ad banners
    pub banners: Vec<ImageBannerView>,
}

/// Link directory plus up to four random ad banners.
pub async fn links<B, M>(State(state): State<AppState<B, M>>) -> Result<Json<LinksResponse>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let categories = catalog::link_directory(&*state.backend).await?;
    let banners = banners::random_banners(&*state.backend, ImageBannerKind::Common, COMMON_BANNER_SLOTS)
        .await?
        .into_iter()
        .map(|banner| ImageBannerView::new(&*state.media, banner))
        .collect();

    Ok(Json(LinksResponse { categories, banners }))
}

/// Guarantee banners in random order.
pub async fn guarantee<B, M>(State(state): State<AppState<B, M>>) -> Result<Json<Vec<ImageBannerView>>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let banners = banners::random_banners(&*state.backend, ImageBannerKind::Guarantee, usize::MAX).await?;
    Ok(Json(
        banners
            .into_iter()
            .map(|banner| ImageBannerView::new(&*state.media, banner))
            .collect(),
    ))
}
