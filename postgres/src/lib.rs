//! `PostgreSQL` storage for linkboard.
//!
//! [`PostgresStore`] implements every repository trait from
//! `linkboard_core::providers` on a single connection pool, plus
//! [`RankedStore`](linkboard_core::providers::RankedStore) for categories and
//! text banners.
//!
//! # Rank integrity
//!
//! Each reorderable table carries `UNIQUE (scope, sort_order) DEFERRABLE
//! INITIALLY DEFERRED`. A swap updates both rows in one transaction with a
//! `WHERE sort_order = <expected>` guard on each, so a row that moved since it
//! was read makes the transaction roll back with
//! [`ContentError::RankConflict`](linkboard_core::ContentError::RankConflict).
//! Deletes renumber the remaining rows of the scope in the same transaction.
//!
//! # Example
//!
//! ```ignore
//! use linkboard_postgres::PostgresStore;
//! use std::time::Duration;
//!
//! let store = PostgresStore::connect("postgres://localhost/linkboard", 10, Duration::from_secs(30)).await?;
//! store.migrate().await?;
//! ```

mod accounts;
mod banners;
mod catalog;
mod ranking;
mod rows;

use linkboard_core::{ContentError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Repository implementations backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`] if the connection fails.
    pub async fn connect(database_url: &str, max_connections: u32, connect_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections, "connected to postgres");
        Ok(Self::new(pool))
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ContentError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Round-trip a trivial query, for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`] if the database is unreachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ContentError::Storage(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Constraint name of a unique violation, if `error` is one.
fn unique_violation(error: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = error {
        if db_err.is_unique_violation() {
            return Some(db_err.constraint().unwrap_or_default().to_string());
        }
    }
    None
}

impl linkboard_core::providers::StorageHealth for PostgresStore {
    async fn ping(&self) -> Result<()> {
        PostgresStore::ping(self).await
    }
}
