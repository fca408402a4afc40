//! Conditional rank swaps and scope compaction.

use crate::{unique_violation, PostgresStore};
use linkboard_core::providers::{Entry, RankedStore};
use linkboard_core::{Category, CategoryId, ContentError, Rank, RankSwap, RankedEntity, RankedEntry, Result};
use linkboard_core::{TextBanner, TextBannerId};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

const SWAP_CATEGORY: &str = "UPDATE text_banner_categories SET sort_order = $1 WHERE id = $2 AND sort_order = $3";

const SWAP_TEXT_BANNER: &str =
    "UPDATE text_banners SET sort_order = $1 WHERE id = $2 AND sort_order = $3 AND category_id = $4";

/// Apply both halves of `assignments` in one transaction, or neither.
///
/// Each `(id, expected, new)` update only matches a row still holding
/// `expected`. If either misses, the transaction is rolled back.
async fn swap_guarded(
    pool: &PgPool,
    resource: &'static str,
    sql: &'static str,
    scope: Option<i64>,
    assignments: [(i64, Rank, Rank); 2],
) -> Result<()> {
    let target = assignments[0].0;
    let conflict = || {
        metrics::counter!("linkboard_rank_conflicts_total", "resource" => resource).increment(1);
        ContentError::RankConflict {
            resource,
            id: target.to_string(),
        }
    };

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to begin swap: {e}")))?;

    for (id, expected, new) in assignments {
        let mut query = sqlx::query(sql).bind(new).bind(id).bind(expected);
        if let Some(scope) = scope {
            query = query.bind(scope);
        }
        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to update rank: {e}")))?;

        if result.rows_affected() != 1 {
            tracing::debug!(resource, id, expected, "rank guard missed, rolling back");
            tx.rollback()
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to roll back swap: {e}")))?;
            return Err(conflict());
        }
    }

    // The deferred unique constraint is checked here.
    tx.commit().await.map_err(|e| {
        if unique_violation(&e).is_some() {
            conflict()
        } else {
            ContentError::Storage(format!("Failed to commit swap: {e}"))
        }
    })
}

/// Renumber categories to `0..n` in their current order.
pub(crate) async fn compact_categories(conn: &mut PgConnection) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE text_banner_categories AS c
        SET sort_order = ranked.position
        FROM (
            SELECT id, (ROW_NUMBER() OVER (ORDER BY sort_order, id) - 1)::INTEGER AS position
            FROM text_banner_categories
        ) AS ranked
        WHERE c.id = ranked.id AND c.sort_order <> ranked.position
        ",
    )
    .execute(conn)
    .await
    .map_err(|e| ContentError::Storage(format!("Failed to renumber categories: {e}")))?;
    Ok(result.rows_affected())
}

/// Renumber the banners of one category to `0..n` in their current order.
pub(crate) async fn compact_text_banners(conn: &mut PgConnection, category: CategoryId) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE text_banners AS b
        SET sort_order = ranked.position
        FROM (
            SELECT id, (ROW_NUMBER() OVER (ORDER BY sort_order, id) - 1)::INTEGER AS position
            FROM text_banners
            WHERE category_id = $1
        ) AS ranked
        WHERE b.id = ranked.id AND b.sort_order <> ranked.position
        ",
    )
    .bind(category.0)
    .execute(conn)
    .await
    .map_err(|e| ContentError::Storage(format!("Failed to renumber text banners: {e}")))?;
    Ok(result.rows_affected())
}

/// Commit a structural change, reporting a committed rank collision as a conflict.
pub(crate) async fn commit(tx: Transaction<'_, Postgres>, resource: &'static str, id: i64) -> Result<()> {
    tx.commit().await.map_err(|e| match unique_violation(&e) {
        Some(constraint) if constraint.ends_with("sort_order_key") => {
            metrics::counter!("linkboard_rank_conflicts_total", "resource" => resource).increment(1);
            ContentError::RankConflict {
                resource,
                id: id.to_string(),
            }
        }
        _ => ContentError::Storage(format!("Failed to commit: {e}")),
    })
}

impl RankedStore<Category> for PostgresStore {
    async fn find_ranked(&self, id: CategoryId) -> Result<Option<Entry<Category>>> {
        let rank: Option<Rank> = sqlx::query_scalar("SELECT sort_order FROM text_banner_categories WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to read category rank: {e}")))?;

        Ok(rank.map(|rank| RankedEntry { id, scope: (), rank }))
    }

    async fn find_at_rank(&self, (): (), rank: Rank) -> Result<Option<Entry<Category>>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM text_banner_categories WHERE sort_order = $1")
            .bind(rank)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to read category at rank: {e}")))?;

        Ok(id.map(|id| RankedEntry {
            id: CategoryId(id),
            scope: (),
            rank,
        }))
    }

    #[tracing::instrument(skip_all, fields(target = %swap.target, neighbor = %swap.neighbor))]
    async fn swap_ranks(&self, (): (), swap: RankSwap<CategoryId>) -> Result<()> {
        let assignments = swap.assignments().map(|(id, expected, new)| (id.0, expected, new));
        swap_guarded(&self.pool, Category::RESOURCE, SWAP_CATEGORY, None, assignments).await
    }
}

impl RankedStore<TextBanner> for PostgresStore {
    async fn find_ranked(&self, id: TextBannerId) -> Result<Option<Entry<TextBanner>>> {
        let row: Option<(i64, Rank)> =
            sqlx::query_as("SELECT category_id, sort_order FROM text_banners WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to read text banner rank: {e}")))?;

        Ok(row.map(|(category, rank)| RankedEntry {
            id,
            scope: CategoryId(category),
            rank,
        }))
    }

    async fn find_at_rank(&self, scope: CategoryId, rank: Rank) -> Result<Option<Entry<TextBanner>>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM text_banners WHERE category_id = $1 AND sort_order = $2")
                .bind(scope.0)
                .bind(rank)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to read text banner at rank: {e}")))?;

        Ok(id.map(|id| RankedEntry {
            id: TextBannerId(id),
            scope,
            rank,
        }))
    }

    #[tracing::instrument(skip_all, fields(scope = %scope, target = %swap.target, neighbor = %swap.neighbor))]
    async fn swap_ranks(&self, scope: CategoryId, swap: RankSwap<TextBannerId>) -> Result<()> {
        let assignments = swap.assignments().map(|(id, expected, new)| (id.0, expected, new));
        swap_guarded(&self.pool, TextBanner::RESOURCE, SWAP_TEXT_BANNER, Some(scope.0), assignments).await
    }
}
