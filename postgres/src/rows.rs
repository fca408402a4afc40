//! Row shapes and their conversion into domain types.

use chrono::{DateTime, Utc};
use linkboard_core::{
    Account, AccountCredentials, AccountId, Category, CategoryId, ContentError, ImageBanner, ImageBannerId,
    ImageBannerKind, Rank, Result, Role, TextBanner, TextBannerId,
};

#[derive(sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: i64,
    code: String,
    name: String,
    sort_order: Rank,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId(row.id),
            code: row.code,
            name: row.name,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TextBannerRow {
    id: i64,
    category_id: i64,
    name: String,
    link: String,
    sort_order: Rank,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<TextBannerRow> for TextBanner {
    fn from(row: TextBannerRow) -> Self {
        Self {
            id: TextBannerId(row.id),
            category_id: CategoryId(row.category_id),
            name: row.name,
            link: row.link,
            sort_order: row.sort_order,
            created_by: row.created_by.map(AccountId),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ImageBannerRow {
    id: i64,
    kind: String,
    name: String,
    link: String,
    image_path: String,
    created_by: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImageBannerRow> for ImageBanner {
    type Error = ContentError;

    fn try_from(row: ImageBannerRow) -> Result<Self> {
        let kind: ImageBannerKind = row.kind.parse().map_err(ContentError::Storage)?;
        Ok(Self {
            id: ImageBannerId(row.id),
            kind,
            name: row.name,
            link: row.link,
            image_path: row.image_path,
            created_by: row.created_by.map(AccountId),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AccountRow {
    id: i64,
    username: String,
    nickname: String,
    password_hash: String,
    role: String,
    is_active: bool,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for AccountCredentials {
    type Error = ContentError;

    fn try_from(row: AccountRow) -> Result<Self> {
        let role: Role = row.role.parse().map_err(ContentError::Storage)?;
        Ok(Self {
            account: Account {
                id: AccountId(row.id),
                username: row.username,
                nickname: row.nickname,
                role,
                is_active: row.is_active,
                image_path: row.image_path,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = ContentError;

    fn try_from(row: AccountRow) -> Result<Self> {
        AccountCredentials::try_from(row).map(|credentials| credentials.account)
    }
}

/// Convert every row, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = ContentError>,
{
    rows.into_iter().map(T::try_from).collect()
}
