//! Domain entities and value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer position of an entity within its ordering scope. Lower sorts first.
pub type Rank = i32;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a text banner category.
    CategoryId
);
numeric_id!(
    /// Identifier of a text banner (link entry).
    TextBannerId
);
numeric_id!(
    /// Identifier of an image banner.
    ImageBannerId
);
numeric_id!(
    /// Identifier of an account (admin or member).
    AccountId
);

/// Direction of a single-step move within an ordering scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// One position earlier (lower rank).
    Up,
    /// One position later (higher rank).
    Down,
}

impl Direction {
    /// Rank of the neighbour in this direction, `None` when it would overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkboard_core::Direction;
    ///
    /// assert_eq!(Direction::Up.neighbor_rank(3), Some(2));
    /// assert_eq!(Direction::Down.neighbor_rank(3), Some(4));
    /// assert_eq!(Direction::Down.neighbor_rank(i32::MAX), None);
    /// ```
    #[must_use]
    pub const fn neighbor_rank(self, rank: Rank) -> Option<Rank> {
        match self {
            Self::Up => rank.checked_sub(1),
            Self::Down => rank.checked_add(1),
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Wire name (`"up"` / `"down"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May use the administrative API.
    Admin,
    /// Regular signed-in member.
    Member,
}

impl Role {
    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// ============================================================================
// Categories and text banners
// ============================================================================

/// A category grouping text banners. All categories share one global ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    pub id: CategoryId,
    /// Unique short code (`[a-z0-9]+`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Rank within the global category ordering.
    pub sort_order: Rank,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating or editing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Unique short code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A text-link banner inside a category. Ordered per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBanner {
    /// Banner id.
    pub id: TextBannerId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Rank within the owning category.
    pub sort_order: Rank,
    /// Account that created the banner, if still known.
    pub created_by: Option<AccountId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a text banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBannerDraft {
    /// Owning category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Creating account.
    pub created_by: Option<AccountId>,
}

/// Editable name and link of a banner (text or image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerDetails {
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
}

// ============================================================================
// Image banners
// ============================================================================

/// Family an image banner belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBannerKind {
    /// Ad banners shown on the links page.
    Common,
    /// Guaranteed-vendor banners.
    Guarantee,
}

impl ImageBannerKind {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Guarantee => "guarantee",
        }
    }

    /// Media directory that stores this family's images.
    #[must_use]
    pub const fn media_dir(self) -> &'static str {
        match self {
            Self::Common => "common-banners",
            Self::Guarantee => "guarantee-banners",
        }
    }

    /// Resource label used in error messages.
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Common => "Common banner",
            Self::Guarantee => "Guarantee banner",
        }
    }
}

impl FromStr for ImageBannerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "guarantee" => Ok(Self::Guarantee),
            other => Err(format!("unknown image banner kind: {other}")),
        }
    }
}

/// An image banner. Listed by creation time, never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBanner {
    /// Banner id.
    pub id: ImageBannerId,
    /// Banner family.
    pub kind: ImageBannerKind,
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Path of the image inside media storage.
    pub image_path: String,
    /// Creating account.
    pub created_by: Option<AccountId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields persisted when creating an image banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBannerDraft {
    /// Banner family.
    pub kind: ImageBannerKind,
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Stored image path.
    pub image_path: String,
    /// Creating account.
    pub created_by: Option<AccountId>,
}

// ============================================================================
// Accounts
// ============================================================================

/// An account as exposed to the application (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// Unique display name.
    pub nickname: String,
    /// Role.
    pub role: Role,
    /// Disabled accounts cannot sign in.
    pub is_active: bool,
    /// Avatar path inside media storage.
    pub image_path: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An account together with its stored password hash, used only for sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    /// The account.
    pub account: Account,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// Fields persisted when creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    /// Login name.
    pub username: String,
    /// Display name.
    pub nickname: String,
    /// Hashed password.
    pub password_hash: String,
    /// Role.
    pub role: Role,
}

/// Profile fields written by a profile update.
///
/// `image_path` is the complete new value; pass the current one to keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New nickname.
    pub nickname: String,
    /// New password hash, if the password changes.
    pub password_hash: Option<String>,
    /// Avatar path after the update.
    pub image_path: Option<String>,
}

/// A file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name, used for the extension only.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lower-cased extension of the original file name, `jpg` when absent.
    ///
    /// ```
    /// use linkboard_core::Upload;
    ///
    /// let upload = Upload { file_name: "Banner.PNG".into(), content_type: "image/png".into(), bytes: vec![1] };
    /// assert_eq!(upload.extension(), "png");
    /// ```
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }

    /// `true` when the client sent no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Up.reverse(), Direction::Down);
    }

    #[test]
    fn test_direction_boundaries() {
        assert_eq!(Direction::Up.neighbor_rank(0), Some(-1));
        assert_eq!(Direction::Up.neighbor_rank(i32::MIN), None);
    }

    #[test]
    fn test_upload_extension_fallbacks() {
        let upload = |name: &str| Upload {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![],
        };
        assert_eq!(upload("photo").extension(), "jpg");
        assert_eq!(upload("photo.").extension(), "jpg");
        assert_eq!(upload("../../etc/passwd.s/h").extension(), "jpg");
        assert_eq!(upload("a.tar.GZ").extension(), "gz");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::Member.to_string(), "member");
    }
}
