//! Category and text banner repositories.

use crate::error::Result;
use crate::types::{BannerDetails, Category, CategoryDraft, CategoryId, TextBanner, TextBannerDraft, TextBannerId};

/// Category persistence.
pub trait CategoryRepository: Send + Sync {
    /// All categories in rank order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_categories(&self) -> impl std::future::Future<Output = Result<Vec<Category>>> + Send;

    /// Category by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_category(&self, id: CategoryId) -> impl std::future::Future<Output = Result<Option<Category>>> + Send;

    /// Insert a category at the end of the global ordering.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code is already used → `ContentError::Conflict`
    /// - The insert fails
    fn create_category(&self, draft: &CategoryDraft) -> impl std::future::Future<Output = Result<Category>> + Send;

    /// Replace code and name. Rank is untouched.
    ///
    /// # Returns
    ///
    /// `None` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code is used by another category → `ContentError::Conflict`
    /// - The update fails
    fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> impl std::future::Future<Output = Result<Option<Category>>> + Send;

    /// Delete a category together with its text banners, then renumber the
    /// remaining categories `0..n`.
    ///
    /// # Returns
    ///
    /// `false` if the category did not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails. Nothing is removed in that case.
    fn delete_category(&self, id: CategoryId) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Text banner persistence.
pub trait TextBannerRepository: Send + Sync {
    /// Text banners ordered by category rank, then banner rank. Restricted to
    /// one category when `category` is given.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn list_text_banners(
        &self,
        category: Option<CategoryId>,
    ) -> impl std::future::Future<Output = Result<Vec<TextBanner>>> + Send;

    /// Text banner by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_text_banner(&self, id: TextBannerId) -> impl std::future::Future<Output = Result<Option<TextBanner>>> + Send;

    /// Insert a text banner at the end of its category.
    ///
    /// The capacity check and the insert are one atomic step, so two
    /// concurrent creates cannot both take the last slot.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The category does not exist → `ContentError::NotFound`
    /// - The category already holds `capacity` banners → `ContentError::CapacityExceeded`
    /// - The insert fails
    fn create_text_banner(
        &self,
        draft: &TextBannerDraft,
        capacity: usize,
    ) -> impl std::future::Future<Output = Result<TextBanner>> + Send;

    /// Replace name and link.
    ///
    /// # Returns
    ///
    /// `None` if the banner does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the update fails.
    fn update_text_banner(
        &self,
        id: TextBannerId,
        details: &BannerDetails,
    ) -> impl std::future::Future<Output = Result<Option<TextBanner>>> + Send;

    /// Delete a text banner, then renumber the rest of its category `0..n`.
    ///
    /// # Returns
    ///
    /// `false` if the banner did not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn delete_text_banner(&self, id: TextBannerId) -> impl std::future::Future<Output = Result<bool>> + Send;
}
