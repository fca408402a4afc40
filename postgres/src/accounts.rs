//! Accounts.

use crate::rows::{convert_all, AccountRow};
use crate::{unique_violation, PostgresStore};
use linkboard_core::providers::{AccountRemoval, AccountRepository};
use linkboard_core::{Account, AccountCredentials, AccountDraft, AccountId, ContentError, ProfileChanges, Result, Role};

/// Map a unique violation on `users` to the field it names.
fn account_conflict(e: sqlx::Error, action: &str) -> ContentError {
    match unique_violation(&e).as_deref() {
        Some("users_username_key") => ContentError::conflict("username", "username is already in use"),
        Some("users_nickname_key") => ContentError::conflict("nickname", "nickname is already in use"),
        _ => ContentError::Storage(format!("Failed to {action}: {e}")),
    }
}

impl AccountRepository for PostgresStore {
    async fn find_credentials(&self, username: &str) -> Result<Option<AccountCredentials>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, username, nickname, password_hash, role, is_active, image_path, created_at
            FROM users WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to find account: {e}")))?;

        row.map(AccountCredentials::try_from).transpose()
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, username, nickname, password_hash, role, is_active, image_path, created_at
            FROM users WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to get account: {e}")))?;

        row.map(Account::try_from).transpose()
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to check username: {e}")))
    }

    async fn nickname_taken(&self, nickname: &str, except: Option<AccountId>) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(nickname)
        .bind(except.map(|a| a.0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to check nickname: {e}")))
    }

    #[tracing::instrument(skip_all, fields(username = %draft.username, role = %draft.role))]
    async fn create_account(&self, draft: &AccountDraft) -> Result<Account> {
        let row: AccountRow = sqlx::query_as(
            r"
            INSERT INTO users (username, nickname, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, nickname, password_hash, role, is_active, image_path, created_at
            ",
        )
        .bind(&draft.username)
        .bind(&draft.nickname)
        .bind(&draft.password_hash)
        .bind(draft.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| account_conflict(e, "create account"))?;

        Account::try_from(row)
    }

    async fn list_accounts(&self, role: Role) -> Result<Vec<Account>> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r"
            SELECT id, username, nickname, password_hash, role, is_active, image_path, created_at
            FROM users WHERE role = $1
            ORDER BY created_at, id
            ",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ContentError::Storage(format!("Failed to list accounts: {e}")))?;

        convert_all(rows)
    }

    async fn rename_account(&self, id: AccountId, nickname: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            UPDATE users SET nickname = $2
            WHERE id = $1
            RETURNING id, username, nickname, password_hash, role, is_active, image_path, created_at
            ",
        )
        .bind(id.0)
        .bind(nickname)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| account_conflict(e, "rename account"))?;

        row.map(Account::try_from).transpose()
    }

    #[tracing::instrument(skip_all, fields(id = %id))]
    async fn update_profile(&self, id: AccountId, changes: &ProfileChanges) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            UPDATE users
            SET nickname = $2,
                password_hash = COALESCE($3, password_hash),
                image_path = $4
            WHERE id = $1
            RETURNING id, username, nickname, password_hash, role, is_active, image_path, created_at
            ",
        )
        .bind(id.0)
        .bind(&changes.nickname)
        .bind(changes.password_hash.as_deref())
        .bind(changes.image_path.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| account_conflict(e, "update profile"))?;

        row.map(Account::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(id = %id, role = %role))]
    async fn delete_unless_last(&self, id: AccountId, role: Role) -> Result<AccountRemoval> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to begin delete: {e}")))?;

        // Locks every holder of the role until commit.
        let holders: Vec<i64> = sqlx::query_scalar("SELECT id FROM users WHERE role = $1 ORDER BY id FOR UPDATE")
            .bind(role.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to lock accounts: {e}")))?;

        let removal = if !holders.contains(&id.0) {
            AccountRemoval::NotFound
        } else if holders.len() <= 1 {
            AccountRemoval::LastOfRole
        } else {
            // Banners keep existing with `created_by` cleared (ON DELETE SET NULL).
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id.0)
                .execute(&mut *tx)
                .await
                .map_err(|e| ContentError::Storage(format!("Failed to delete account: {e}")))?;
            AccountRemoval::Deleted
        };

        tx.commit()
            .await
            .map_err(|e| ContentError::Storage(format!("Failed to commit delete: {e}")))?;
        Ok(removal)
    }
}
