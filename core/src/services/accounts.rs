//! Registration, sign-in, admin management and profile edits.

use super::required;
use crate::error::{ContentError, Result};
use crate::providers::{AccountRemoval, AccountRepository, MediaStorage, PasswordHasher};
use crate::types::{Account, AccountDraft, AccountId, ProfileChanges, Role, Upload};
use crate::MIN_PASSWORD_LENGTH;
use serde::Deserialize;

/// Sign-up form, used for members and for admins created by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub nickname: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

/// Changes requested through the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New nickname (required).
    pub nickname: String,
    /// New password; `None` or empty keeps the current one.
    pub password: Option<String>,
    /// New avatar; `None` or empty keeps the current one.
    pub avatar: Option<Upload>,
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] if the password is too short.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ContentError::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Media path of an account's avatar.
#[must_use]
pub fn avatar_path(id: AccountId, upload: &Upload) -> String {
    format!("avatars/{id}/profile.{}", upload.extension())
}

/// Register a member account.
///
/// # Errors
///
/// - [`ContentError::Validation`] for missing fields or a short password
/// - [`ContentError::Conflict`] naming `username` or `nickname` if taken
pub async fn register_member<R, H>(repo: &R, hasher: &H, registration: &Registration) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    create_account(repo, hasher, registration, Role::Member).await
}

/// Create an admin account.
///
/// # Errors
///
/// Same as [`register_member`].
pub async fn create_admin<R, H>(repo: &R, hasher: &H, registration: &Registration) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    create_account(repo, hasher, registration, Role::Admin).await
}

#[tracing::instrument(skip(repo, hasher, registration), fields(username = %registration.username.trim()))]
async fn create_account<R, H>(repo: &R, hasher: &H, registration: &Registration, role: Role) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let username = required(&registration.username, "all fields are required")?;
    let nickname = required(&registration.nickname, "all fields are required")?;
    if registration.password.is_empty() {
        return Err(ContentError::validation("all fields are required"));
    }
    validate_password(&registration.password)?;

    if repo.username_taken(&username).await? {
        return Err(ContentError::conflict("username", "username is already in use"));
    }
    if repo.nickname_taken(&nickname, None).await? {
        return Err(ContentError::conflict("nickname", "nickname is already in use"));
    }

    let draft = AccountDraft {
        username,
        nickname,
        password_hash: hasher.hash(&registration.password)?,
        role,
    };

    let account = repo.create_account(&draft).await?;
    tracing::info!(id = %account.id, role = %account.role, "account created");
    Ok(account)
}

/// Whether a username is registered.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn username_taken<R>(repo: &R, username: &str) -> Result<bool>
where
    R: AccountRepository + ?Sized,
{
    repo.username_taken(username.trim()).await
}

/// Whether a nickname is used by anyone.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn nickname_taken<R>(repo: &R, nickname: &str) -> Result<bool>
where
    R: AccountRepository + ?Sized,
{
    repo.nickname_taken(nickname.trim(), None).await
}

/// Check a username and password.
///
/// # Errors
///
/// - [`ContentError::Validation`] if either is blank
/// - [`ContentError::InvalidCredentials`] for an unknown user or wrong password
/// - [`ContentError::AccountDisabled`] if the password matches a disabled account
#[tracing::instrument(skip(repo, hasher, password))]
pub async fn authenticate<R, H>(repo: &R, hasher: &H, username: &str, password: &str) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    if username.trim().is_empty() || password.is_empty() {
        return Err(ContentError::validation("username and password are required"));
    }

    let Some(credentials) = repo.find_credentials(username.trim()).await? else {
        tracing::debug!("unknown username");
        return Err(ContentError::InvalidCredentials);
    };

    if !hasher.verify(password, &credentials.password_hash)? {
        tracing::debug!(id = %credentials.account.id, "password mismatch");
        return Err(ContentError::InvalidCredentials);
    }

    if !credentials.account.is_active {
        return Err(ContentError::AccountDisabled);
    }

    Ok(credentials.account)
}

/// Admin accounts, oldest first.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn list_admins<R>(repo: &R) -> Result<Vec<Account>>
where
    R: AccountRepository + ?Sized,
{
    repo.list_accounts(Role::Admin).await
}

async fn get_admin<R>(repo: &R, id: AccountId) -> Result<Account>
where
    R: AccountRepository + ?Sized,
{
    repo.get_account(id)
        .await?
        .filter(|account| account.role == Role::Admin)
        .ok_or_else(|| ContentError::not_found("Admin", id))
}

/// Change an admin's nickname.
///
/// # Errors
///
/// - [`ContentError::Validation`] for a blank nickname
/// - [`ContentError::NotFound`] if `id` is not an admin
/// - [`ContentError::Conflict`] if another account uses the nickname
#[tracing::instrument(skip(repo))]
pub async fn rename_admin<R>(repo: &R, id: AccountId, nickname: &str) -> Result<Account>
where
    R: AccountRepository + ?Sized,
{
    let nickname = required(nickname, "nickname is required")?;
    get_admin(repo, id).await?;

    if repo.nickname_taken(&nickname, Some(id)).await? {
        return Err(ContentError::conflict("nickname", "nickname is already in use"));
    }

    repo.rename_account(id, &nickname)
        .await?
        .ok_or_else(|| ContentError::not_found("Admin", id))
}

/// Delete admin `id` on behalf of admin `actor`.
///
/// # Errors
///
/// - [`ContentError::Validation`] if `actor` deletes itself or `id` is the last admin
/// - [`ContentError::NotFound`] if `id` is not an admin
#[tracing::instrument(skip(repo))]
pub async fn remove_admin<R>(repo: &R, actor: AccountId, id: AccountId) -> Result<()>
where
    R: AccountRepository + ?Sized,
{
    if actor == id {
        return Err(ContentError::validation("you cannot delete your own account"));
    }

    match repo.delete_unless_last(id, Role::Admin).await? {
        AccountRemoval::Deleted => {
            tracing::info!("admin removed");
            Ok(())
        }
        AccountRemoval::NotFound => Err(ContentError::not_found("Admin", id)),
        AccountRemoval::LastOfRole => Err(ContentError::validation("at least one admin must remain")),
    }
}

/// Apply a profile form to account `id`.
///
/// A new avatar overwrites `avatars/<id>/profile.<ext>`. Once the account row
/// is updated, a previous avatar stored under a different extension is removed.
/// If the row update fails, a newly stored file is removed again and the
/// previous avatar is left in place.
///
/// # Errors
///
/// - [`ContentError::Validation`] for a blank nickname or short password
/// - [`ContentError::NotFound`] if the account does not exist
/// - [`ContentError::Conflict`] if another account uses the nickname
/// - [`ContentError::Media`] if the avatar cannot be stored
#[tracing::instrument(skip(repo, hasher, media, update))]
pub async fn update_profile<R, H, M>(
    repo: &R,
    hasher: &H,
    media: &M,
    id: AccountId,
    update: ProfileUpdate,
) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    M: MediaStorage + ?Sized,
{
    let nickname = required(&update.nickname, "nickname is required")?;
    let password = update.password.filter(|password| !password.is_empty());
    if let Some(password) = &password {
        validate_password(password)?;
    }

    let account = repo
        .get_account(id)
        .await?
        .ok_or_else(|| ContentError::not_found("Account", id))?;

    if nickname != account.nickname && repo.nickname_taken(&nickname, Some(id)).await? {
        return Err(ContentError::conflict("nickname", "nickname is already in use"));
    }

    let password_hash = password.as_deref().map(|p| hasher.hash(p)).transpose()?;

    let mut stored = None;
    if let Some(avatar) = update.avatar.filter(|avatar| !avatar.is_empty()) {
        let path = avatar_path(id, &avatar);
        media.put(&path, avatar.bytes, &avatar.content_type, true).await?;
        stored = Some(path);
    }

    let changes = ProfileChanges {
        nickname,
        password_hash,
        image_path: stored.clone().or_else(|| account.image_path.clone()),
    };

    let result = repo
        .update_profile(id, &changes)
        .await
        .and_then(|updated| updated.ok_or_else(|| ContentError::not_found("Account", id)));

    let updated = match result {
        Ok(updated) => updated,
        Err(err) => {
            // Same path means the upload overwrote the file the row still points at.
            if let Some(path) = stored.as_deref().filter(|path| account.image_path.as_deref() != Some(*path)) {
                if let Err(cleanup) = media.remove(path).await {
                    tracing::warn!(%path, error = %cleanup, "orphaned avatar left in storage");
                }
            }
            return Err(err);
        }
    };

    if let (Some(path), Some(previous)) = (stored.as_deref(), account.image_path.as_deref()) {
        if previous != path {
            if let Err(err) = media.remove(previous).await {
                tracing::warn!(path = %previous, error = %err, "failed to remove previous avatar");
            }
        }
    }

    Ok(updated)
}

/// Remove the avatar of account `id`.
///
/// # Errors
///
/// - [`ContentError::NotFound`] if the account does not exist
/// - [`ContentError::Validation`] if the account has no avatar
/// - [`ContentError::Media`] if the file cannot be removed; the account keeps its avatar
#[tracing::instrument(skip(repo, media))]
pub async fn remove_avatar<R, M>(repo: &R, media: &M, id: AccountId) -> Result<Account>
where
    R: AccountRepository + ?Sized,
    M: MediaStorage + ?Sized,
{
    let account = repo
        .get_account(id)
        .await?
        .ok_or_else(|| ContentError::not_found("Account", id))?;

    let Some(path) = account.image_path.as_deref() else {
        return Err(ContentError::validation("there is no profile image to delete"));
    };
    media.remove(path).await?;

    let changes = ProfileChanges {
        nickname: account.nickname.clone(),
        password_hash: None,
        image_path: None,
    };

    repo.update_profile(id, &changes)
        .await?
        .ok_or_else(|| ContentError::not_found("Account", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length_counts_characters() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        // 8 multi-byte characters
        assert!(validate_password("비밀번호비밀번호").is_ok());
    }

    #[test]
    fn test_avatar_path() {
        let upload = Upload {
            file_name: "me.PNG".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1],
        };
        assert_eq!(avatar_path(AccountId(3), &upload), "avatars/3/profile.png");
    }
}
