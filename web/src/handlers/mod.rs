//! HTTP request handlers, organized by resource.
//!
//! Every handler is generic over the [`Backend`](crate::state::Backend) and
//! [`MediaStorage`](linkboard_core::providers::MediaStorage) implementations
//! and is registered with turbofish in [`router`](crate::router::router).

pub mod admins;
pub mod auth;
pub mod categories;
pub mod health;
pub mod image_banners;
pub mod profile;
pub mod public;
pub mod text_banners;

use crate::error::AppError;
use axum::extract::Multipart;
use linkboard_core::{Direction, Upload};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use health::{health_check, readiness_check};

/// `{"ok": true}` acknowledgement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    /// Always `true`
    pub ok: bool,
}

impl Ack {
    /// Successful acknowledgement.
    pub const OK: Self = Self { ok: true };
}

/// Body of a reorder request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderRequest {
    /// Where to move the entity
    pub direction: Direction,
}

/// Response to a reorder request.
///
/// A move at the edge of the ordering succeeds with `moved: false`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderResponse {
    /// Always `true`
    pub ok: bool,
    /// Whether ranks changed
    pub moved: bool,
}

/// A decoded `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    /// Read every field of `multipart`.
    ///
    /// Parts with a file name are kept as uploads, everything else as text.
    ///
    /// # Errors
    ///
    /// Returns 400 if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                form.files.insert(
                    name,
                    Upload {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            } else {
                form.texts.insert(name, field.text().await?);
            }
        }

        Ok(form)
    }

    /// Text field `name`, empty if absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.texts.get(name).cloned().unwrap_or_default()
    }

    /// Text field `name` if present and not blank.
    #[must_use]
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.texts.get(name).filter(|value| !value.is_empty()).cloned()
    }

    /// Take the non-empty file named `name`.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name).filter(|upload| !upload.is_empty())
    }
}
