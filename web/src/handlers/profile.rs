//! Profile edits for the signed-in account.
//!
//! Both handlers re-issue the session cookie so the nickname and avatar in
//! the claims follow the account.

use super::auth::session_header;
use super::{Ack, FormData};
use crate::error::AppError;
use crate::extractors::SessionUser;
use crate::state::{AppState, Backend};
use axum::{
    extract::{Multipart, State},
    http::HeaderName,
    Json,
};
use linkboard_core::providers::MediaStorage;
use linkboard_core::services::accounts::{self, ProfileUpdate};
use serde::{Deserialize, Serialize};

/// Profile after an update.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Current nickname
    pub nickname: String,
    /// Avatar path inside media storage
    pub image_path: Option<String>,
    /// Public avatar URL
    pub image_url: Option<String>,
}

/// Update nickname, password and avatar.
///
/// `multipart/form-data` fields: `nickname` (required), `password`
/// (optional, at least 8 characters), `image` (optional file).
pub async fn update_profile<B, M>(
    State(state): State<AppState<B, M>>,
    SessionUser(claims): SessionUser,
    multipart: Multipart,
) -> Result<([(HeaderName, String); 1], Json<ProfileResponse>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let mut form = FormData::read(multipart).await?;
    let update = ProfileUpdate {
        nickname: form.text("nickname"),
        password: form.optional_text("password"),
        avatar: form.take_file("image"),
    };

    let account =
        accounts::update_profile(&*state.backend, &*state.hasher, &*state.media, claims.user_id, update).await?;
    let headers = session_header(&state.sessions, &account)?;

    let image_url = account.image_path.as_deref().map(|path| state.media.public_url(path));
    Ok((
        headers,
        Json(ProfileResponse {
            nickname: account.nickname,
            image_path: account.image_path,
            image_url,
        }),
    ))
}

/// Remove the avatar. `400` if there is none.
pub async fn delete_image<B, M>(
    State(state): State<AppState<B, M>>,
    SessionUser(claims): SessionUser,
) -> Result<([(HeaderName, String); 1], Json<Ack>), AppError>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let account = accounts::remove_avatar(&*state.backend, &*state.media, claims.user_id).await?;
    let headers = session_header(&state.sessions, &account)?;
    Ok((headers, Json(Ack::OK)))
}
