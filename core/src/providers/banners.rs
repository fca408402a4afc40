//! Image banner repository.

use crate::error::Result;
use crate::types::{BannerDetails, ImageBanner, ImageBannerDraft, ImageBannerId, ImageBannerKind};

/// Image banner persistence. Every operation is confined to one [`ImageBannerKind`].
pub trait ImageBannerRepository: Send + Sync {
    /// Banners of `kind`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_image_banners(
        &self,
        kind: ImageBannerKind,
    ) -> impl std::future::Future<Output = Result<Vec<ImageBanner>>> + Send;

    /// Banner by id within `kind`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
    ) -> impl std::future::Future<Output = Result<Option<ImageBanner>>> + Send;

    /// Insert a banner.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    fn create_image_banner(
        &self,
        draft: &ImageBannerDraft,
    ) -> impl std::future::Future<Output = Result<ImageBanner>> + Send;

    /// Replace name and link.
    ///
    /// # Errors
    ///
    /// Returns error if the update fails.
    fn update_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
        details: &BannerDetails,
    ) -> impl std::future::Future<Output = Result<Option<ImageBanner>>> + Send;

    /// Delete a banner and return the removed row, so its image can be removed too.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn delete_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
    ) -> impl std::future::Future<Output = Result<Option<ImageBanner>>> + Send;
}
