//! # Linkboard Testing
//!
//! Test doubles for every provider trait in `linkboard-core`:
//!
//! - [`InMemoryStore`]: all repositories plus both ranked stores, with a
//!   write counter and write-failure injection
//! - [`InMemoryMedia`]: media storage in a map
//! - [`PlainTextHasher`]: reversible "hashing" so tests stay fast
//! - [`FixedClock`] / [`test_clock`]: deterministic time
//! - [`fixtures`]: drafts and uploads with sensible defaults
//! - [`properties`]: proptest strategies for domain values
//!
//! ## Example
//!
//! ```
//! use linkboard_core::services::{catalog, reorder::{reorder, ReorderOutcome}};
//! use linkboard_core::{Category, Direction};
//! use linkboard_testing::{fixtures, InMemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//! let first = catalog::create_category(&store, &fixtures::category_draft("a")).await?;
//!
//! let outcome = reorder::<Category, _>(&store, first.id, Direction::Up).await?;
//! assert_eq!(outcome, ReorderOutcome::AtBoundary);
//! # Ok::<(), linkboard_core::ContentError>(())
//! # });
//! ```

use chrono::{DateTime, Utc};
use linkboard_core::environment::Clock;

mod media;
mod store;

pub use media::InMemoryMedia;
pub use store::InMemoryStore;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use linkboard_core::providers::PasswordHasher;
    use linkboard_core::Result;

    /// Fixed clock for deterministic tests.
    ///
    /// ```
    /// use linkboard_testing::mocks::FixedClock;
    /// use linkboard_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a fixed clock at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock at 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_735_689_600))
    }

    /// "Hashes" by prefixing. Never use outside tests.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PlainTextHasher;

    impl PasswordHasher for PlainTextHasher {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(format!("plain${password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool> {
            Ok(hash.strip_prefix("plain$") == Some(password))
        }
    }
}

/// Drafts and uploads with sensible defaults.
pub mod fixtures {
    use linkboard_core::services::accounts::Registration;
    use linkboard_core::{AccountId, BannerDetails, CategoryDraft, CategoryId, TextBannerDraft, Upload};

    /// Category with code `code` and name `"Category <code>"`.
    #[must_use]
    pub fn category_draft(code: &str) -> CategoryDraft {
        CategoryDraft {
            code: code.to_string(),
            name: format!("Category {code}"),
        }
    }

    /// Text banner named `name` in `category`, linking to `https://<name>.example`.
    #[must_use]
    pub fn text_banner_draft(category: CategoryId, name: &str) -> TextBannerDraft {
        TextBannerDraft {
            category_id: category,
            name: name.to_string(),
            link: format!("https://{name}.example"),
            created_by: None,
        }
    }

    /// Name and link for an image banner.
    #[must_use]
    pub fn banner_details(name: &str) -> BannerDetails {
        BannerDetails {
            name: name.to_string(),
            link: format!("https://{name}.example"),
        }
    }

    /// Sign-up form with password `password123`.
    #[must_use]
    pub fn registration(username: &str, nickname: &str) -> Registration {
        Registration {
            username: username.to_string(),
            nickname: nickname.to_string(),
            password: "password123".to_string(),
        }
    }

    /// A small PNG upload named `file_name`.
    #[must_use]
    pub fn png_upload(file_name: &str) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
        }
    }

    /// An account id that no store hands out.
    #[must_use]
    pub const fn unknown_account() -> AccountId {
        AccountId(9_999)
    }
}

/// Property-based testing utilities.
pub mod properties {
    use linkboard_core::Direction;
    use proptest::prelude::*;

    /// Either direction.
    pub fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Up), Just(Direction::Down)]
    }

    /// Up to `max_moves` moves, each picking an index below `len` and a direction.
    pub fn moves(len: usize, max_moves: usize) -> impl Strategy<Value = Vec<(usize, Direction)>> {
        prop::collection::vec((0..len.max(1), direction()), 0..=max_moves)
    }
}

/// Install a test-friendly `tracing` subscriber once. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub use mocks::{test_clock, FixedClock, PlainTextHasher};
