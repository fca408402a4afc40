//! Categories and text banners.

use crate::ranking::{commit, compact_categories, compact_text_banners};
use crate::rows::{CategoryRow, TextBannerRow};
use crate::{unique_violation, PostgresStore};
use linkboard_core::providers::{CategoryRepository, TextBannerRepository};
use linkboard_core::{
    BannerDetails, Category, CategoryDraft, CategoryId, ContentError, Result, TextBanner, TextBannerDraft,
    TextBannerId,
};

fn code_conflict(e: sqlx::Error, action: &str) -> ContentError {
    match unique_violation(&e) {
        Some(constraint) if constraint == "text_banner_categories_code_key" => {
            ContentError::conflict("code", "code is already in use")
        }
        _ => ContentError::Storage(format!("Failed to {action}: {e}")),
    }
}

impl CategoryRepository for PostgresStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, code, name, sort_order, created_at FROM text_banner_categories ORDER BY sort_order",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to list categories: {e}")))?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, code, name, sort_order, created_at FROM text_banner_categories WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to get category: {e}")))?;

        Ok(row.map(Category::from))
    }

    #[tracing::instrument(skip_all, fields(code = %draft.code))]
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to begin transaction: {e}")))?;

        // Serializes appends so two creates never pick the same next rank.
        sqlx::query("LOCK TABLE text_banner_categories IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to lock categories: {e}")))?;

        let row: CategoryRow = sqlx::query_as(
            r"
            INSERT INTO text_banner_categories (code, name, sort_order)
            SELECT $1, $2, COALESCE(MAX(sort_order) + 1, 0) FROM text_banner_categories
            RETURNING id, code, name, sort_order, created_at
            ",
        )
        .bind(&draft.code)
        .bind(&draft.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| code_conflict(e, "create category"))?;

        let category = Category::from(row);
        commit(tx, "Category", category.id.0).await?;
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r"
            UPDATE text_banner_categories SET code = $2, name = $3
            WHERE id = $1
            RETURNING id, code, name, sort_order, created_at
            ",
        )
        .bind(id.0)
        .bind(&draft.code)
        .bind(&draft.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| code_conflict(e, "update category"))?;

        Ok(row.map(Category::from))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("LOCK TABLE text_banner_categories IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to lock categories: {e}")))?;

        // Text banners go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM text_banner_categories WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to delete category: {e}")))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to roll back: {e}")))?;
            return Ok(false);
        }

        let renumbered = compact_categories(&mut *tx).await?;
        commit(tx, "Category", id.0).await?;

        tracing::debug!(renumbered, "category deleted");
        Ok(true)
    }
}

impl TextBannerRepository for PostgresStore {
    async fn list_text_banners(&self, category: Option<CategoryId>) -> Result<Vec<TextBanner>> {
        let rows: Vec<TextBannerRow> = sqlx::query_as(
            r"
            SELECT b.id, b.category_id, b.name, b.link, b.sort_order, b.created_by, b.created_at
            FROM text_banners b
            JOIN text_banner_categories c ON c.id = b.category_id
            WHERE $1::BIGINT IS NULL OR b.category_id = $1
            ORDER BY c.sort_order, b.category_id, b.sort_order
            ",
        )
        .bind(category.map(|c| c.0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to list text banners: {e}")))?;

        Ok(rows.into_iter().map(TextBanner::from).collect())
    }

    async fn get_text_banner(&self, id: TextBannerId) -> Result<Option<TextBanner>> {
        let row: Option<TextBannerRow> = sqlx::query_as(
            r"
            SELECT id, category_id, name, link, sort_order, created_by, created_at
            FROM text_banners WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to get text banner: {e}")))?;

        Ok(row.map(TextBanner::from))
    }

    #[tracing::instrument(skip_all, fields(category = %draft.category_id))]
    async fn create_text_banner(&self, draft: &TextBannerDraft, capacity: usize) -> Result<TextBanner> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to begin transaction: {e}")))?;

        // Holding the category row makes the capacity check and the append atomic.
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM text_banner_categories WHERE id = $1 FOR UPDATE")
                .bind(draft.category_id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to lock category: {e}")))?;
        if exists.is_none() {
            return Err(ContentError::not_found("Category", draft.category_id));
        }

        let (count, next): (i64, i32) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(MAX(sort_order) + 1, 0) FROM text_banners WHERE category_id = $1",
        )
        .bind(draft.category_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to count text banners: {e}")))?;

        if usize::try_from(count).unwrap_or(usize::MAX) >= capacity {
            return Err(ContentError::CapacityExceeded {
                category_id: draft.category_id,
                limit: capacity,
            });
        }

        let row: TextBannerRow = sqlx::query_as(
            r"
            INSERT INTO text_banners (category_id, name, link, sort_order, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category_id, name, link, sort_order, created_by, created_at
            ",
        )
        .bind(draft.category_id.0)
        .bind(&draft.name)
        .bind(&draft.link)
        .bind(next)
        .bind(draft.created_by.map(|a| a.0))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to create text banner: {e}")))?;

        let banner = TextBanner::from(row);
        commit(tx, "Text banner", banner.id.0).await?;
        Ok(banner)
    }

    async fn update_text_banner(&self, id: TextBannerId, details: &BannerDetails) -> Result<Option<TextBanner>> {
        let row: Option<TextBannerRow> = sqlx::query_as(
            r"
            UPDATE text_banners SET name = $2, link = $3
            WHERE id = $1
            RETURNING id, category_id, name, link, sort_order, created_by, created_at
            ",
        )
        .bind(id.0)
        .bind(&details.name)
        .bind(&details.link)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to update text banner: {e}")))?;

        Ok(row.map(TextBanner::from))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_text_banner(&self, id: TextBannerId) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to begin transaction: {e}")))?;

        let category: Option<i64> = sqlx::query_scalar(
            r"
            SELECT c.id FROM text_banner_categories c
            JOIN text_banners b ON b.category_id = c.id
            WHERE b.id = $1
            FOR UPDATE OF c
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to lock category: {e}")))?;

        let Some(category) = category.map(CategoryId) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM text_banners WHERE id = $1 AND category_id = $2")
            .bind(id.0)
            .bind(category.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to delete text banner: {e}")))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let renumbered = compact_text_banners(&mut *tx, category).await?;
        commit(tx, "Text banner", id.0).await?;

        tracing::debug!(%category, renumbered, "text banner deleted");
        Ok(true)
    }
}
