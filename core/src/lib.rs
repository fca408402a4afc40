//! # Linkboard Core
//!
//! Domain model and business rules for the linkboard content manager: categorized
//! text-link banners, image banners and the accounts that manage them.
//!
//! ## Layout
//!
//! - [`types`]: entities, ids, drafts and the [`Direction`] of a move
//! - [`ordering`]: the rank model shared by every reorderable entity
//! - [`providers`]: traits for persistence, media storage and password hashing
//! - [`services`]: the operations exposed to the HTTP layer
//! - [`environment`]: injected time source
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  services (validation, rules) │  ← pure decisions, no SQL
//! ├──────────────────────────────┤
//! │  providers (traits)           │  ← PostgreSQL / in-memory / filesystem
//! └──────────────────────────────┘
//! ```
//!
//! Services only ever talk to providers, so every rule can be exercised against
//! the in-memory implementations from `linkboard-testing`.
//!
//! ## Example
//!
//! ```ignore
//! use linkboard_core::{services::reorder, Category, CategoryId, Direction};
//!
//! let outcome = reorder::reorder::<Category, _>(&store, CategoryId(7), Direction::Up).await?;
//! ```

#![forbid(unsafe_code)]

pub mod environment;
pub mod error;
pub mod ordering;
pub mod providers;
pub mod services;
pub mod types;

pub use error::{ContentError, Result};
pub use ordering::{OrderedScope, RankSwap, RankedEntity, RankedEntry};
pub use types::*;

/// Maximum number of text banners a single category may hold.
pub const MAX_TEXT_BANNERS_PER_CATEGORY: usize = 10;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of ad banner slots on the public links page.
pub const COMMON_BANNER_SLOTS: usize = 4;
