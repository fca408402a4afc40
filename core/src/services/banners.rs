//! Image banners (ad and guarantee families) and their stored images.

use super::catalog::validate_details;
use crate::error::{ContentError, Result};
use crate::providers::{ImageBannerRepository, MediaStorage};
use crate::types::{AccountId, BannerDetails, ImageBanner, ImageBannerDraft, ImageBannerId, ImageBannerKind, Upload};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

/// Media path for a new banner image: `<family dir>/<uuid>.<ext>`.
#[must_use]
pub fn image_path(kind: ImageBannerKind, upload: &Upload) -> String {
    format!("{}/{}.{}", kind.media_dir(), Uuid::new_v4(), upload.extension())
}

/// Banners of one family by creation time.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn list_image_banners<R>(repo: &R, kind: ImageBannerKind) -> Result<Vec<ImageBanner>>
where
    R: ImageBannerRepository + ?Sized,
{
    repo.list_image_banners(kind).await
}

/// Store the image, then the row. The image is removed again if the row
/// cannot be written.
///
/// # Errors
///
/// - [`ContentError::Validation`] if name, link or file is missing
/// - [`ContentError::Media`] if the image cannot be stored
/// - [`ContentError::Storage`] if the row cannot be written
#[tracing::instrument(skip(repo, media, details, upload), fields(kind = kind.as_str()))]
pub async fn create_image_banner<R, M>(
    repo: &R,
    media: &M,
    kind: ImageBannerKind,
    details: &BannerDetails,
    upload: Upload,
    created_by: Option<AccountId>,
) -> Result<ImageBanner>
where
    R: ImageBannerRepository + ?Sized,
    M: MediaStorage + ?Sized,
{
    let details = validate_details(details)
        .map_err(|_| ContentError::validation("name, link and file are required"))?;
    if upload.is_empty() {
        return Err(ContentError::validation("name, link and file are required"));
    }

    let path = image_path(kind, &upload);
    media
        .put(&path, upload.bytes, &upload.content_type, false)
        .await?;

    let draft = ImageBannerDraft {
        kind,
        name: details.name,
        link: details.link,
        image_path: path.clone(),
        created_by,
    };

    match repo.create_image_banner(&draft).await {
        Ok(banner) => {
            tracing::info!(id = %banner.id, path = %banner.image_path, "image banner created");
            Ok(banner)
        }
        Err(err) => {
            if let Err(cleanup) = media.remove(&path).await {
                tracing::warn!(%path, error = %cleanup, "orphaned banner image left in storage");
            }
            Err(err)
        }
    }
}

/// Edit name and link. The image stays.
///
/// # Errors
///
/// - [`ContentError::Validation`] if name or link is blank
/// - [`ContentError::NotFound`] if the banner does not exist
#[tracing::instrument(skip(repo, details), fields(kind = kind.as_str()))]
pub async fn update_image_banner<R>(
    repo: &R,
    kind: ImageBannerKind,
    id: ImageBannerId,
    details: &BannerDetails,
) -> Result<ImageBanner>
where
    R: ImageBannerRepository + ?Sized,
{
    let details = validate_details(details)?;
    repo.update_image_banner(kind, id, &details)
        .await?
        .ok_or_else(|| ContentError::not_found(kind.resource(), id))
}

/// Delete the row, then its image.
///
/// Failing to remove the image does not fail the call: the banner is gone.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] if the banner does not exist.
#[tracing::instrument(skip(repo, media), fields(kind = kind.as_str()))]
pub async fn delete_image_banner<R, M>(repo: &R, media: &M, kind: ImageBannerKind, id: ImageBannerId) -> Result<()>
where
    R: ImageBannerRepository + ?Sized,
    M: MediaStorage + ?Sized,
{
    let banner = repo
        .delete_image_banner(kind, id)
        .await?
        .ok_or_else(|| ContentError::not_found(kind.resource(), id))?;

    if let Err(err) = media.remove(&banner.image_path).await {
        tracing::warn!(path = %banner.image_path, error = %err, "failed to remove banner image");
    }
    Ok(())
}

/// Shuffle `items` and keep at most `limit` of them.
pub fn pick_random<T, G>(mut items: Vec<T>, limit: usize, rng: &mut G) -> Vec<T>
where
    G: Rng + ?Sized,
{
    items.shuffle(rng);
    items.truncate(limit);
    items
}

/// Up to `slots` randomly chosen banners of `kind`.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn random_banners<R>(repo: &R, kind: ImageBannerKind, slots: usize) -> Result<Vec<ImageBanner>>
where
    R: ImageBannerRepository + ?Sized,
{
    let banners = repo.list_image_banners(kind).await?;
    Ok(pick_random(banners, slots, &mut rand::thread_rng()))
}
