//! Categories, text banners and the public link directory.

use super::required;
use crate::error::{ContentError, Result};
use crate::providers::{CategoryRepository, TextBannerRepository};
use crate::types::{BannerDetails, Category, CategoryDraft, CategoryId, TextBanner, TextBannerDraft, TextBannerId};
use crate::MAX_TEXT_BANNERS_PER_CATEGORY;
use serde::Serialize;
use std::collections::HashMap;

/// Trim a category draft and check its fields.
///
/// Code and name are required; the code must be lower-case ASCII letters and digits.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] describing the first invalid field.
pub fn validate_category(draft: &CategoryDraft) -> Result<CategoryDraft> {
    let code = required(&draft.code, "code and name are required")?;
    let name = required(&draft.name, "code and name are required")?;

    if !code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(ContentError::validation(
            "code may only contain lower-case letters and digits",
        ));
    }

    Ok(CategoryDraft { code, name })
}

/// Trim banner details and check that both are present.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] if name or link is blank.
pub fn validate_details(details: &BannerDetails) -> Result<BannerDetails> {
    Ok(BannerDetails {
        name: required(&details.name, "name and link are required")?,
        link: required(&details.link, "name and link are required")?,
    })
}

/// All categories in rank order.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn list_categories<R>(repo: &R) -> Result<Vec<Category>>
where
    R: CategoryRepository + ?Sized,
{
    repo.list_categories().await
}

/// Create a category at the end of the ordering.
///
/// # Errors
///
/// - [`ContentError::Validation`] for invalid input
/// - [`ContentError::Conflict`] if the code is taken
#[tracing::instrument(skip(repo))]
pub async fn create_category<R>(repo: &R, draft: &CategoryDraft) -> Result<Category>
where
    R: CategoryRepository + ?Sized,
{
    let draft = validate_category(draft)?;
    let category = repo.create_category(&draft).await?;
    tracing::info!(id = %category.id, rank = category.sort_order, "category created");
    Ok(category)
}

/// Edit code and name of a category.
///
/// # Errors
///
/// - [`ContentError::Validation`] for invalid input
/// - [`ContentError::NotFound`] if the category does not exist
/// - [`ContentError::Conflict`] if the code is taken by another category
#[tracing::instrument(skip(repo))]
pub async fn update_category<R>(repo: &R, id: CategoryId, draft: &CategoryDraft) -> Result<Category>
where
    R: CategoryRepository + ?Sized,
{
    let draft = validate_category(draft)?;
    repo.update_category(id, &draft)
        .await?
        .ok_or_else(|| ContentError::not_found("Category", id))
}

/// Delete a category and every text banner inside it.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] if the category does not exist.
#[tracing::instrument(skip(repo))]
pub async fn delete_category<R>(repo: &R, id: CategoryId) -> Result<()>
where
    R: CategoryRepository + ?Sized,
{
    if repo.delete_category(id).await? {
        tracing::info!("category deleted");
        Ok(())
    } else {
        Err(ContentError::not_found("Category", id))
    }
}

/// Text banners, optionally restricted to one category.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn list_text_banners<R>(repo: &R, category: Option<CategoryId>) -> Result<Vec<TextBanner>>
where
    R: TextBannerRepository + ?Sized,
{
    repo.list_text_banners(category).await
}

/// Append a text banner to its category.
///
/// # Errors
///
/// - [`ContentError::Validation`] for blank name or link
/// - [`ContentError::NotFound`] if the category does not exist
/// - [`ContentError::CapacityExceeded`] if the category is full
#[tracing::instrument(skip(repo, draft), fields(category = %draft.category_id))]
pub async fn create_text_banner<R>(repo: &R, draft: &TextBannerDraft) -> Result<TextBanner>
where
    R: TextBannerRepository + ?Sized,
{
    let details = validate_details(&BannerDetails {
        name: draft.name.clone(),
        link: draft.link.clone(),
    })?;

    let draft = TextBannerDraft {
        category_id: draft.category_id,
        name: details.name,
        link: details.link,
        created_by: draft.created_by,
    };

    let banner = repo
        .create_text_banner(&draft, MAX_TEXT_BANNERS_PER_CATEGORY)
        .await?;
    tracing::info!(id = %banner.id, rank = banner.sort_order, "text banner created");
    Ok(banner)
}

/// Edit name and link of a text banner.
///
/// # Errors
///
/// - [`ContentError::Validation`] for blank name or link
/// - [`ContentError::NotFound`] if the banner does not exist
#[tracing::instrument(skip(repo, details))]
pub async fn update_text_banner<R>(repo: &R, id: TextBannerId, details: &BannerDetails) -> Result<TextBanner>
where
    R: TextBannerRepository + ?Sized,
{
    let details = validate_details(details)?;
    repo.update_text_banner(id, &details)
        .await?
        .ok_or_else(|| ContentError::not_found("Text banner", id))
}

/// Delete a text banner.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] if the banner does not exist.
#[tracing::instrument(skip(repo))]
pub async fn delete_text_banner<R>(repo: &R, id: TextBannerId) -> Result<()>
where
    R: TextBannerRepository + ?Sized,
{
    if repo.delete_text_banner(id).await? {
        Ok(())
    } else {
        Err(ContentError::not_found("Text banner", id))
    }
}

/// One category of the public link directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLinks {
    /// The category.
    #[serde(flatten)]
    pub category: Category,
    /// Its text banners in rank order.
    pub banners: Vec<TextBanner>,
}

/// Every category in rank order with its text banners in rank order.
///
/// # Errors
///
/// Returns error if the repository fails.
pub async fn link_directory<R>(repo: &R) -> Result<Vec<CategoryLinks>>
where
    R: CategoryRepository + TextBannerRepository + ?Sized,
{
    let categories = repo.list_categories().await?;

    let mut by_category: HashMap<CategoryId, Vec<TextBanner>> = HashMap::new();
    for banner in repo.list_text_banners(None).await? {
        by_category.entry(banner.category_id).or_default().push(banner);
    }

    let directory = categories
        .into_iter()
        .map(|category| {
            let mut banners = by_category.remove(&category.id).unwrap_or_default();
            banners.sort_by_key(|banner| banner.sort_order);
            CategoryLinks { category, banners }
        })
        .collect();

    Ok(directory)
}
