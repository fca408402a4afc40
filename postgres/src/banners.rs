//! Common and guarantee image banners.

use crate::rows::{convert_all, ImageBannerRow};
use crate::PostgresStore;
use linkboard_core::providers::ImageBannerRepository;
use linkboard_core::{
    BannerDetails, ContentError, ImageBanner, ImageBannerDraft, ImageBannerId, ImageBannerKind, Result,
};

impl ImageBannerRepository for PostgresStore {
    async fn list_image_banners(&self, kind: ImageBannerKind) -> Result<Vec<ImageBanner>> {
        let rows: Vec<ImageBannerRow> = sqlx::query_as(
            r"
            SELECT id, kind, name, link, image_path, created_by, created_at
            FROM image_banners
            WHERE kind = $1
            ORDER BY created_at, id
            ",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to list {} banners: {e}", kind.as_str())))?;

        convert_all(rows)
    }

    async fn get_image_banner(&self, kind: ImageBannerKind, id: ImageBannerId) -> Result<Option<ImageBanner>> {
        let row: Option<ImageBannerRow> = sqlx::query_as(
            r"
            SELECT id, kind, name, link, image_path, created_by, created_at
            FROM image_banners
            WHERE kind = $1 AND id = $2
            ",
        )
        .bind(kind.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to get image banner: {e}")))?;

        row.map(ImageBanner::try_from).transpose()
    }

    #[tracing::instrument(skip_all, fields(kind = draft.kind.as_str()))]
    async fn create_image_banner(&self, draft: &ImageBannerDraft) -> Result<ImageBanner> {
        let row: ImageBannerRow = sqlx::query_as(
            r"
            INSERT INTO image_banners (kind, name, link, image_path, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, name, link, image_path, created_by, created_at
            ",
        )
        .bind(draft.kind.as_str())
        .bind(&draft.name)
        .bind(&draft.link)
        .bind(&draft.image_path)
        .bind(draft.created_by.map(|a| a.0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to create image banner: {e}")))?;

        ImageBanner::try_from(row)
    }

    async fn update_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
        details: &BannerDetails,
    ) -> Result<Option<ImageBanner>> {
        let row: Option<ImageBannerRow> = sqlx::query_as(
            r"
            UPDATE image_banners SET name = $3, link = $4
            WHERE kind = $1 AND id = $2
            RETURNING id, kind, name, link, image_path, created_by, created_at
            ",
        )
        .bind(kind.as_str())
        .bind(id.0)
        .bind(&details.name)
        .bind(&details.link)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to update image banner: {e}")))?;

        row.map(ImageBanner::try_from).transpose()
    }

    async fn delete_image_banner(&self, kind: ImageBannerKind, id: ImageBannerId) -> Result<Option<ImageBanner>> {
        let row: Option<ImageBannerRow> = sqlx::query_as(
            r"
            DELETE FROM image_banners
            WHERE kind = $1 AND id = $2
            RETURNING id, kind, name, link, image_path, created_by, created_at
            ",
        )
        .bind(kind.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to delete image banner: {e}")))?;

        row.map(ImageBanner::try_from).transpose()
    }
}
