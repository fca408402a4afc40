//! In-memory implementation of every repository.

use crate::mocks::{test_clock, FixedClock};
use chrono::{DateTime, Duration, Utc};
use linkboard_core::environment::Clock;
use linkboard_core::ordering::{next_rank, OrderedScope, RankSwap, RankedEntry};
use linkboard_core::providers::{
    AccountRemoval, AccountRepository, CategoryRepository, Entry, ImageBannerRepository, RankedStore, StorageHealth,
    TextBannerRepository,
};
use linkboard_core::{
    Account, AccountCredentials, AccountDraft, AccountId, BannerDetails, Category, CategoryDraft, CategoryId,
    ContentError, ImageBanner, ImageBannerDraft, ImageBannerId, ImageBannerKind, ProfileChanges, Rank, Result,
    Role, TextBanner, TextBannerDraft, TextBannerId,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<CategoryId, Category>,
    text_banners: BTreeMap<TextBannerId, TextBanner>,
    image_banners: BTreeMap<ImageBannerId, ImageBanner>,
    accounts: BTreeMap<AccountId, AccountCredentials>,
    last_id: i64,
    writes: usize,
    fail_writes: bool,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(ContentError::Storage("injected write failure".to_string()));
        }
        Ok(())
    }

    fn category_scope(&self) -> Result<OrderedScope<CategoryId>> {
        OrderedScope::from_entries(self.categories.values().map(|c| (c.id, c.sort_order)))
            .map_err(ContentError::storage)
    }

    fn banner_scope(&self, category: CategoryId) -> Result<OrderedScope<TextBannerId>> {
        OrderedScope::from_entries(
            self.text_banners
                .values()
                .filter(|b| b.category_id == category)
                .map(|b| (b.id, b.sort_order)),
        )
        .map_err(ContentError::storage)
    }

    fn category_rank(&self, id: CategoryId) -> Rank {
        self.categories.get(&id).map_or(Rank::MAX, |c| c.sort_order)
    }

    fn username_taken(&self, username: &str) -> bool {
        self.accounts.values().any(|c| c.account.username == username)
    }

    fn nickname_taken(&self, nickname: &str, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|c| c.account.nickname == nickname && Some(c.account.id) != except)
    }
}

fn lock(tables: &Mutex<Tables>) -> Result<MutexGuard<'_, Tables>> {
    tables
        .lock()
        .map_err(|_| ContentError::Storage("in-memory store lock poisoned".to_string()))
}

/// In-memory store implementing every repository and both ranked stores.
///
/// All rows live behind one mutex, so every operation (including a swap of
/// two ranks) is atomic. Scopes are rebuilt as [`OrderedScope`]s for every
/// rank mutation, which rejects duplicate ranks.
///
/// Ids are allocated from one sequence shared by all tables. Row timestamps
/// are the clock time plus the id in seconds, so creation order is stable.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: FixedClock,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store using [`test_clock`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(test_clock())
    }

    /// Empty store using `clock` for row timestamps.
    #[must_use]
    pub fn with_clock(clock: FixedClock) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    /// Number of row writes performed so far (each inserted, updated or deleted row counts once).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.tables.lock().map_or(0, |t| t.writes)
    }

    /// Make every following write fail with [`ContentError::Storage`] (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.fail_writes = fail;
        }
    }

    /// Enable or disable an account.
    pub fn set_account_active(&self, id: AccountId, active: bool) {
        if let Ok(mut tables) = self.tables.lock() {
            if let Some(credentials) = tables.accounts.get_mut(&id) {
                credentials.account.is_active = active;
            }
        }
    }

    /// The global category scope.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`] if two categories share a rank.
    pub fn category_scope(&self) -> Result<OrderedScope<CategoryId>> {
        lock(&self.tables)?.category_scope()
    }

    /// The text banner scope of `category`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`] if two banners of the category share a rank.
    pub fn banner_scope(&self, category: CategoryId) -> Result<OrderedScope<TextBannerId>> {
        lock(&self.tables)?.banner_scope(category)
    }

    fn stamp(&self, id: i64) -> DateTime<Utc> {
        self.clock.now() + Duration::seconds(id)
    }
}

impl StorageHealth for InMemoryStore {
    /// Fails while injected write failures are on.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        let tables = Arc::clone(&self.tables);

        async move { lock(&tables)?.writable() }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Ranked stores
// ═══════════════════════════════════════════════════════════════════════

impl RankedStore<Category> for InMemoryStore {
    fn find_ranked(&self, id: CategoryId) -> impl Future<Output = Result<Option<Entry<Category>>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            Ok(lock(&tables)?.categories.get(&id).map(|c| RankedEntry {
                id: c.id,
                scope: (),
                rank: c.sort_order,
            }))
        }
    }

    fn find_at_rank(&self, (): (), rank: Rank) -> impl Future<Output = Result<Option<Entry<Category>>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            Ok(lock(&tables)?
                .categories
                .values()
                .find(|c| c.sort_order == rank)
                .map(|c| RankedEntry {
                    id: c.id,
                    scope: (),
                    rank: c.sort_order,
                }))
        }
    }

    fn swap_ranks(&self, (): (), swap: RankSwap<CategoryId>) -> impl Future<Output = Result<()>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let mut scope = tables.category_scope()?;
            scope.apply(&swap).map_err(|_| ContentError::RankConflict {
                resource: "Category",
                id: swap.target.to_string(),
            })?;

            for (id, _, rank) in swap.assignments() {
                if let Some(category) = tables.categories.get_mut(&id) {
                    category.sort_order = rank;
                }
            }
            tables.writes += 2;
            Ok(())
        }
    }
}

impl RankedStore<TextBanner> for InMemoryStore {
    fn find_ranked(&self, id: TextBannerId) -> impl Future<Output = Result<Option<Entry<TextBanner>>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            Ok(lock(&tables)?.text_banners.get(&id).map(|b| RankedEntry {
                id: b.id,
                scope: b.category_id,
                rank: b.sort_order,
            }))
        }
    }

    fn find_at_rank(
        &self,
        scope: CategoryId,
        rank: Rank,
    ) -> impl Future<Output = Result<Option<Entry<TextBanner>>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            Ok(lock(&tables)?
                .text_banners
                .values()
                .find(|b| b.category_id == scope && b.sort_order == rank)
                .map(|b| RankedEntry {
                    id: b.id,
                    scope: b.category_id,
                    rank: b.sort_order,
                }))
        }
    }

    fn swap_ranks(&self, scope: CategoryId, swap: RankSwap<TextBannerId>) -> impl Future<Output = Result<()>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let mut ordered = tables.banner_scope(scope)?;
            ordered.apply(&swap).map_err(|_| ContentError::RankConflict {
                resource: "Text banner",
                id: swap.target.to_string(),
            })?;

            for (id, _, rank) in swap.assignments() {
                if let Some(banner) = tables.text_banners.get_mut(&id) {
                    banner.sort_order = rank;
                }
            }
            tables.writes += 2;
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Categories and text banners
// ═══════════════════════════════════════════════════════════════════════

impl CategoryRepository for InMemoryStore {
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut categories: Vec<Category> = lock(&tables)?.categories.values().cloned().collect();
            categories.sort_by_key(|c| c.sort_order);
            Ok(categories)
        }
    }

    fn get_category(&self, id: CategoryId) -> impl Future<Output = Result<Option<Category>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move { Ok(lock(&tables)?.categories.get(&id).cloned()) }
    }

    fn create_category(&self, draft: &CategoryDraft) -> impl Future<Output = Result<Category>> + Send {
        let tables = Arc::clone(&self.tables);
        let draft = draft.clone();
        let store = self.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if tables.categories.values().any(|c| c.code == draft.code) {
                return Err(ContentError::conflict("code", "code is already in use"));
            }

            let id = tables.allocate_id();
            let category = Category {
                id: CategoryId(id),
                code: draft.code,
                name: draft.name,
                sort_order: next_rank(tables.categories.values().map(|c| c.sort_order)),
                created_at: store.stamp(id),
            };
            tables.categories.insert(category.id, category.clone());
            tables.writes += 1;
            Ok(category)
        }
    }

    fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> impl Future<Output = Result<Option<Category>>> + Send {
        let tables = Arc::clone(&self.tables);
        let draft = draft.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if tables.categories.values().any(|c| c.code == draft.code && c.id != id) {
                return Err(ContentError::conflict("code", "code is already in use"));
            }

            let Some(category) = tables.categories.get_mut(&id) else {
                return Ok(None);
            };
            category.code = draft.code;
            category.name = draft.name;
            let category = category.clone();
            tables.writes += 1;
            Ok(Some(category))
        }
    }

    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<bool>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let mut scope = tables.category_scope()?;
            let Some(renumbered) = scope.remove(id) else {
                return Ok(false);
            };

            let before = tables.text_banners.len();
            tables.text_banners.retain(|_, b| b.category_id != id);
            let cascaded = before - tables.text_banners.len();
            tables.categories.remove(&id);

            for &(other, rank) in &renumbered {
                if let Some(category) = tables.categories.get_mut(&other) {
                    category.sort_order = rank;
                }
            }
            tables.writes += 1 + cascaded + renumbered.len();
            Ok(true)
        }
    }
}

impl TextBannerRepository for InMemoryStore {
    fn list_text_banners(&self, category: Option<CategoryId>) -> impl Future<Output = Result<Vec<TextBanner>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let tables = lock(&tables)?;
            let mut banners: Vec<TextBanner> = tables
                .text_banners
                .values()
                .filter(|b| category.is_none_or(|c| b.category_id == c))
                .cloned()
                .collect();
            banners.sort_by_key(|b| (tables.category_rank(b.category_id), b.category_id, b.sort_order));
            Ok(banners)
        }
    }

    fn get_text_banner(&self, id: TextBannerId) -> impl Future<Output = Result<Option<TextBanner>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move { Ok(lock(&tables)?.text_banners.get(&id).cloned()) }
    }

    fn create_text_banner(
        &self,
        draft: &TextBannerDraft,
        capacity: usize,
    ) -> impl Future<Output = Result<TextBanner>> + Send {
        let tables = Arc::clone(&self.tables);
        let draft = draft.clone();
        let store = self.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if !tables.categories.contains_key(&draft.category_id) {
                return Err(ContentError::not_found("Category", draft.category_id));
            }

            let ranks: Vec<Rank> = tables
                .text_banners
                .values()
                .filter(|b| b.category_id == draft.category_id)
                .map(|b| b.sort_order)
                .collect();
            if ranks.len() >= capacity {
                return Err(ContentError::CapacityExceeded {
                    category_id: draft.category_id,
                    limit: capacity,
                });
            }

            let id = tables.allocate_id();
            let banner = TextBanner {
                id: TextBannerId(id),
                category_id: draft.category_id,
                name: draft.name,
                link: draft.link,
                sort_order: next_rank(ranks),
                created_by: draft.created_by,
                created_at: store.stamp(id),
            };
            tables.text_banners.insert(banner.id, banner.clone());
            tables.writes += 1;
            Ok(banner)
        }
    }

    fn update_text_banner(
        &self,
        id: TextBannerId,
        details: &BannerDetails,
    ) -> impl Future<Output = Result<Option<TextBanner>>> + Send {
        let tables = Arc::clone(&self.tables);
        let details = details.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let Some(banner) = tables.text_banners.get_mut(&id) else {
                return Ok(None);
            };
            banner.name = details.name;
            banner.link = details.link;
            let banner = banner.clone();
            tables.writes += 1;
            Ok(Some(banner))
        }
    }

    fn delete_text_banner(&self, id: TextBannerId) -> impl Future<Output = Result<bool>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let Some(category) = tables.text_banners.get(&id).map(|b| b.category_id) else {
                return Ok(false);
            };

            let mut scope = tables.banner_scope(category)?;
            let renumbered = scope.remove(id).unwrap_or_default();
            tables.text_banners.remove(&id);

            for &(other, rank) in &renumbered {
                if let Some(banner) = tables.text_banners.get_mut(&other) {
                    banner.sort_order = rank;
                }
            }
            tables.writes += 1 + renumbered.len();
            Ok(true)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Image banners
// ═══════════════════════════════════════════════════════════════════════

impl ImageBannerRepository for InMemoryStore {
    fn list_image_banners(&self, kind: ImageBannerKind) -> impl Future<Output = Result<Vec<ImageBanner>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut banners: Vec<ImageBanner> = lock(&tables)?
                .image_banners
                .values()
                .filter(|b| b.kind == kind)
                .cloned()
                .collect();
            banners.sort_by_key(|b| (b.created_at, b.id));
            Ok(banners)
        }
    }

    fn get_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
    ) -> impl Future<Output = Result<Option<ImageBanner>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            Ok(lock(&tables)?
                .image_banners
                .get(&id)
                .filter(|b| b.kind == kind)
                .cloned())
        }
    }

    fn create_image_banner(&self, draft: &ImageBannerDraft) -> impl Future<Output = Result<ImageBanner>> + Send {
        let tables = Arc::clone(&self.tables);
        let draft = draft.clone();
        let store = self.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let id = tables.allocate_id();
            let banner = ImageBanner {
                id: ImageBannerId(id),
                kind: draft.kind,
                name: draft.name,
                link: draft.link,
                image_path: draft.image_path,
                created_by: draft.created_by,
                created_at: store.stamp(id),
            };
            tables.image_banners.insert(banner.id, banner.clone());
            tables.writes += 1;
            Ok(banner)
        }
    }

    fn update_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
        details: &BannerDetails,
    ) -> impl Future<Output = Result<Option<ImageBanner>>> + Send {
        let tables = Arc::clone(&self.tables);
        let details = details.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            let Some(banner) = tables.image_banners.get_mut(&id).filter(|b| b.kind == kind) else {
                return Ok(None);
            };
            banner.name = details.name;
            banner.link = details.link;
            let banner = banner.clone();
            tables.writes += 1;
            Ok(Some(banner))
        }
    }

    fn delete_image_banner(
        &self,
        kind: ImageBannerKind,
        id: ImageBannerId,
    ) -> impl Future<Output = Result<Option<ImageBanner>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if !tables.image_banners.get(&id).is_some_and(|b| b.kind == kind) {
                return Ok(None);
            }
            let removed = tables.image_banners.remove(&id);
            tables.writes += 1;
            Ok(removed)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════════════════

impl AccountRepository for InMemoryStore {
    fn find_credentials(&self, username: &str) -> impl Future<Output = Result<Option<AccountCredentials>>> + Send {
        let tables = Arc::clone(&self.tables);
        let username = username.to_string();

        async move {
            Ok(lock(&tables)?
                .accounts
                .values()
                .find(|c| c.account.username == username)
                .cloned())
        }
    }

    fn get_account(&self, id: AccountId) -> impl Future<Output = Result<Option<Account>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move { Ok(lock(&tables)?.accounts.get(&id).map(|c| c.account.clone())) }
    }

    fn username_taken(&self, username: &str) -> impl Future<Output = Result<bool>> + Send {
        let tables = Arc::clone(&self.tables);
        let username = username.to_string();

        async move { Ok(lock(&tables)?.username_taken(&username)) }
    }

    fn nickname_taken(&self, nickname: &str, except: Option<AccountId>) -> impl Future<Output = Result<bool>> + Send {
        let tables = Arc::clone(&self.tables);
        let nickname = nickname.to_string();

        async move { Ok(lock(&tables)?.nickname_taken(&nickname, except)) }
    }

    fn create_account(&self, draft: &AccountDraft) -> impl Future<Output = Result<Account>> + Send {
        let tables = Arc::clone(&self.tables);
        let draft = draft.clone();
        let store = self.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if tables.username_taken(&draft.username) {
                return Err(ContentError::conflict("username", "username is already in use"));
            }
            if tables.nickname_taken(&draft.nickname, None) {
                return Err(ContentError::conflict("nickname", "nickname is already in use"));
            }

            let id = tables.allocate_id();
            let account = Account {
                id: AccountId(id),
                username: draft.username,
                nickname: draft.nickname,
                role: draft.role,
                is_active: true,
                image_path: None,
                created_at: store.stamp(id),
            };
            tables.accounts.insert(
                account.id,
                AccountCredentials {
                    account: account.clone(),
                    password_hash: draft.password_hash,
                },
            );
            tables.writes += 1;
            Ok(account)
        }
    }

    fn list_accounts(&self, role: Role) -> impl Future<Output = Result<Vec<Account>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut accounts: Vec<Account> = lock(&tables)?
                .accounts
                .values()
                .filter(|c| c.account.role == role)
                .map(|c| c.account.clone())
                .collect();
            accounts.sort_by_key(|a| (a.created_at, a.id));
            Ok(accounts)
        }
    }

    fn rename_account(&self, id: AccountId, nickname: &str) -> impl Future<Output = Result<Option<Account>>> + Send {
        let tables = Arc::clone(&self.tables);
        let nickname = nickname.to_string();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if tables.nickname_taken(&nickname, Some(id)) {
                return Err(ContentError::conflict("nickname", "nickname is already in use"));
            }
            let Some(credentials) = tables.accounts.get_mut(&id) else {
                return Ok(None);
            };
            credentials.account.nickname = nickname;
            let account = credentials.account.clone();
            tables.writes += 1;
            Ok(Some(account))
        }
    }

    fn update_profile(
        &self,
        id: AccountId,
        changes: &ProfileChanges,
    ) -> impl Future<Output = Result<Option<Account>>> + Send {
        let tables = Arc::clone(&self.tables);
        let changes = changes.clone();

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if tables.nickname_taken(&changes.nickname, Some(id)) {
                return Err(ContentError::conflict("nickname", "nickname is already in use"));
            }
            let Some(credentials) = tables.accounts.get_mut(&id) else {
                return Ok(None);
            };
            credentials.account.nickname = changes.nickname;
            credentials.account.image_path = changes.image_path;
            if let Some(hash) = changes.password_hash {
                credentials.password_hash = hash;
            }
            let account = credentials.account.clone();
            tables.writes += 1;
            Ok(Some(account))
        }
    }

    fn delete_unless_last(&self, id: AccountId, role: Role) -> impl Future<Output = Result<AccountRemoval>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let mut tables = lock(&tables)?;
            tables.writable()?;

            if !tables.accounts.get(&id).is_some_and(|c| c.account.role == role) {
                return Ok(AccountRemoval::NotFound);
            }
            if tables.accounts.values().filter(|c| c.account.role == role).count() <= 1 {
                return Ok(AccountRemoval::LastOfRole);
            }

            tables.accounts.remove(&id);
            for banner in tables.text_banners.values_mut().filter(|b| b.created_by == Some(id)) {
                banner.created_by = None;
            }
            for banner in tables.image_banners.values_mut().filter(|b| b.created_by == Some(id)) {
                banner.created_by = None;
            }
            tables.writes += 1;
            Ok(AccountRemoval::Deleted)
        }
    }
}
