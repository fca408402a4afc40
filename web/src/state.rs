//! Application state shared by every handler.

use axum::extract::FromRef;
use linkboard_auth::SessionSigner;
use linkboard_core::providers::{
    AccountRepository, CategoryRepository, ImageBannerRepository, MediaStorage, PasswordHasher, RankedStore,
    StorageHealth, TextBannerRepository,
};
use linkboard_core::{Category, TextBanner};
use std::sync::Arc;

/// Everything the HTTP layer needs from persistence.
///
/// Implemented by `PostgresStore` in production and `InMemoryStore` in tests.
pub trait Backend:
    CategoryRepository
    + TextBannerRepository
    + ImageBannerRepository
    + AccountRepository
    + RankedStore<Category>
    + RankedStore<TextBanner>
    + StorageHealth
    + 'static
{
}

impl<T> Backend for T where
    T: CategoryRepository
        + TextBannerRepository
        + ImageBannerRepository
        + AccountRepository
        + RankedStore<Category>
        + RankedStore<TextBanner>
        + StorageHealth
        + 'static
{
}

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is behind an `Arc`.
pub struct AppState<B, M> {
    /// Repositories
    pub backend: Arc<B>,
    /// Image storage
    pub media: Arc<M>,
    /// Password hashing
    pub hasher: Arc<dyn PasswordHasher>,
    /// Session tokens
    pub sessions: Arc<SessionSigner>,
}

impl<B, M> AppState<B, M>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    /// Create a new application state.
    #[must_use]
    pub fn new(backend: Arc<B>, media: Arc<M>, hasher: Arc<dyn PasswordHasher>, sessions: Arc<SessionSigner>) -> Self {
        Self {
            backend,
            media,
            hasher,
            sessions,
        }
    }
}

impl<B, M> Clone for AppState<B, M> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            media: Arc::clone(&self.media),
            hasher: Arc::clone(&self.hasher),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

// Lets the session extractors reach the signer from any state.
impl<B, M> FromRef<AppState<B, M>> for Arc<SessionSigner> {
    fn from_ref(state: &AppState<B, M>) -> Self {
        Arc::clone(&state.sessions)
    }
}
