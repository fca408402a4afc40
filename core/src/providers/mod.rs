//! Provider traits.
//!
//! Services depend on these interfaces only. `linkboard-postgres` implements
//! the repositories on PostgreSQL, `linkboard-web` implements [`MediaStorage`]
//! on the local filesystem, `linkboard-auth` implements [`PasswordHasher`] with
//! argon2, and `linkboard-testing` provides in-memory versions of all of them.
//!
//! ```text
//! ┌────────────────────┐      ┌─────────────────────────┐
//! │ services::reorder  │─────▶│ RankedStore<Category>   │
//! │ services::catalog  │─────▶│ RankedStore<TextBanner> │
//! │                    │─────▶│ CategoryRepository      │
//! │                    │─────▶│ TextBannerRepository    │
//! │ services::banners  │─────▶│ ImageBannerRepository   │
//! │                    │─────▶│ MediaStorage            │
//! │ services::accounts │─────▶│ AccountRepository       │
//! │                    │─────▶│ PasswordHasher          │
//! └────────────────────┘      └─────────────────────────┘
//! ```

mod accounts;
mod banners;
mod catalog;
mod health;
mod media;
mod ranked;

pub use accounts::{AccountRemoval, AccountRepository, PasswordHasher};
pub use banners::ImageBannerRepository;
pub use catalog::{CategoryRepository, TextBannerRepository};
pub use health::StorageHealth;
pub use media::{is_clean_media_path, MediaStorage};
pub use ranked::{Entry, RankedStore};
