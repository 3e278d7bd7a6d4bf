//! core::model
//!
//! Entity records owned by a [`Collection`](super::collection::Collection).
//!
//! # Structural vs Volatile
//!
//! - **Structural**: id, group, order, name, description, external reference
//! - **Volatile**: the display link, which the blob store reissues and is
//!   refreshed every time the manifest is loaded
//! - **Local-only**: the preview, which points at data on this machine and is
//!   never written to the manifest

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::types::{GroupId, ImageId};

/// An image in the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Stable identifier
    pub id: ImageId,
    /// Display name (usually the original file name)
    pub name: String,
    /// Owning group
    pub group_id: GroupId,
    /// Position within the group (derived from list order)
    pub order: u32,
    /// When the image was added to the gallery
    pub date_added: DateTime<Utc>,
    /// Free-form caption
    pub description: String,
    /// Identifier of the backing blob in the store
    pub external_ref: String,
    /// Size of the backing blob in bytes
    pub size: u64,
    /// Refreshable thumbnail link handed out by the store
    pub display_link: Option<String>,
    /// Persisted fields this crate does not interpret
    pub extra: Map<String, Value>,
    /// Local preview for freshly uploaded images
    pub preview: Option<LocalPreview>,
}

impl Image {
    /// Create an image with a fresh timestamp and empty description.
    ///
    /// The order is assigned when the image is inserted into a collection.
    pub fn new(
        id: ImageId,
        name: impl Into<String>,
        group_id: GroupId,
        external_ref: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            group_id,
            order: 0,
            date_added: Utc::now(),
            description: String::new(),
            external_ref: external_ref.into(),
            size,
            display_link: None,
            extra: Map::new(),
            preview: None,
        }
    }

    /// Set the timestamp.
    pub fn with_date_added(mut self, date_added: DateTime<Utc>) -> Self {
        self.date_added = date_added;
        self
    }

    /// Set the caption.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the display link.
    pub fn with_display_link(mut self, link: impl Into<String>) -> Self {
        self.display_link = Some(link.into());
        self
    }

    /// Attach a local preview.
    pub fn with_preview(mut self, preview: LocalPreview) -> Self {
        self.preview = Some(preview);
        self
    }
}

/// Preview data that only exists on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPreview {
    /// File the image was uploaded from
    pub path: PathBuf,
}

impl LocalPreview {
    /// Preview backed by a local file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `file://` URL usable by a renderer.
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// A named content group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,
    /// Unique display name
    pub name: String,
    /// Position among content groups
    pub order: u32,
}

impl Group {
    /// Create a group record.
    pub fn new(id: GroupId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            order,
        }
    }
}

/// Access-control metadata held by the password sentinel.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessSettings {
    /// Lowercase hex SHA-256 of the gallery password
    pub hashed_password: String,
}

// The hash is not the password, but it still unlocks the gallery.
impl std::fmt::Debug for AccessSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessSettings")
            .field("hashed_password", &"[REDACTED]")
            .finish()
    }
}
