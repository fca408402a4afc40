//! Account repository and password hashing.

use crate::error::Result;
use crate::types::{Account, AccountCredentials, AccountDraft, AccountId, ProfileChanges, Role};

/// Outcome of [`AccountRepository::delete_unless_last`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRemoval {
    /// The account was deleted.
    Deleted,
    /// No account with that id holds the role.
    NotFound,
    /// The account is the only one left with the role. Nothing was deleted.
    LastOfRole,
}

/// Account persistence.
pub trait AccountRepository: Send + Sync {
    /// Account with its password hash, looked up by username.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_credentials(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<AccountCredentials>>> + Send;

    /// Account by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_account(&self, id: AccountId) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// `true` if the username is registered.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn username_taken(&self, username: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// `true` if the nickname is used by any account other than `except`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn nickname_taken(
        &self,
        nickname: &str,
        except: Option<AccountId>,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Insert an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Username or nickname is taken → `ContentError::Conflict`
    /// - The insert fails
    fn create_account(&self, draft: &AccountDraft) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Accounts holding `role`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_accounts(&self, role: Role) -> impl std::future::Future<Output = Result<Vec<Account>>> + Send;

    /// Change the nickname.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The nickname is taken → `ContentError::Conflict`
    /// - The update fails
    fn rename_account(
        &self,
        id: AccountId,
        nickname: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// Apply a profile update.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The nickname is taken → `ContentError::Conflict`
    /// - The update fails
    fn update_profile(
        &self,
        id: AccountId,
        changes: &ProfileChanges,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// Delete account `id` if it holds `role` and is not the last account that does.
    ///
    /// The check and the delete are one atomic step, so concurrent removals
    /// can never leave `role` without accounts. Content the account created
    /// keeps existing with no creator.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn delete_unless_last(
        &self,
        id: AccountId,
        role: Role,
    ) -> impl std::future::Future<Output = Result<AccountRemoval>> + Send;
}

/// Password hashing.
///
/// Synchronous: hashing is CPU-bound, callers decide where it runs.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing (PHC) string.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Hashing`](crate::ContentError::Hashing) if hashing fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// `true` if `password` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Hashing`](crate::ContentError::Hashing) if `hash`
    /// cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
