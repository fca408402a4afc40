//! Image banner administration.
//!
//! Both families (`/api/admin/common-banners` and `/api/admin/image-banners`)
//! share these handlers; the router puts the family in an [`Extension`].

use super::{Ack, FormData};
use crate::error::AppError;
use crate::extractors::{AppJson, AppPath, RequireAdmin};
use crate::state::{AppState, Backend};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::banners;
use linkboard_core::{BannerDetails, ImageBanner, ImageBannerId, ImageBannerKind};
use serde::Serialize;

/// An image banner with the public URL of its image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageBannerView {
    /// The banner
    #[serde(flatten)]
    pub banner: ImageBanner,
    /// Where the image is served
    pub image_url: String,
}

impl ImageBannerView {
    /// Attach the public URL from `media`.
    pub fn new<M: MediaStorage + ?Sized>(media: &M, banner: ImageBanner) -> Self {
        let image_url = media.public_url(&banner.image_path);
        Self { banner, image_url }
    }
}

/// Banners of the family, oldest first.
pub async fn list_image_banners<B, M>(
    State(state): State<AppState<B, M>>,
    Extension(kind): Extension<ImageBannerKind>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ImageBannerView>>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let banners = banners::list_image_banners(&*state.backend, kind).await?;
    Ok(Json(
        banners
            .into_iter()
            .map(|banner| ImageBannerView::new(&*state.media, banner))
            .collect(),
    ))
}

/// Upload a banner.
///
/// `multipart/form-data` with text fields `name` and `link` and a `file` part.
pub async fn create_image_banner<B, M>(
    State(state): State<AppState<B, M>>,
    Extension(kind): Extension<ImageBannerKind>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImageBannerView>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let mut form = FormData::read(multipart).await?;
    let details = BannerDetails {
        name: form.text("name"),
        link: form.text("link"),
    };
    let Some(upload) = form.take_file("file") else {
        return Err(AppError::bad_request("name, link and file are required"));
    };

    let banner = banners::create_image_banner(
        &*state.backend,
        &*state.media,
        kind,
        &details,
        upload,
        Some(admin.user_id),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ImageBannerView::new(&*state.media, banner))))
}

/// Edit name and link. The image is kept.
pub async fn update_image_banner<B, M>(
    State(state): State<AppState<B, M>>,
    Extension(kind): Extension<ImageBannerKind>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
    AppJson(details): AppJson<BannerDetails>,
) -> Result<Json<ImageBannerView>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let banner = banners::update_image_banner(&*state.backend, kind, ImageBannerId(id), &details).await?;
    Ok(Json(ImageBannerView::new(&*state.media, banner)))
}

/// Delete a banner and its stored image.
pub async fn delete_image_banner<B, M>(
    State(state): State<AppState<B, M>>,
    Extension(kind): Extension<ImageBannerKind>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Ack>, AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    banners::delete_image_banner(&*state.backend, &*state.media, kind, ImageBannerId(id)).await?;
    Ok(Json(Ack::OK))
}
