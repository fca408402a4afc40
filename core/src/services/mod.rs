//! Operations exposed to the HTTP layer.
//!
//! Each service is a set of free async functions generic over the provider
//! traits it needs. Services validate input, enforce the business rules and
//! translate provider results (`None`, `false`) into [`ContentError`](crate::ContentError)s.

pub mod accounts;
pub mod banners;
pub mod catalog;
pub mod reorder;

/// Trim `value` and fail with `message` if nothing is left.
pub(crate) fn required(value: &str, message: &str) -> crate::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::ContentError::validation(message));
    }
    Ok(trimmed.to_string())
}
