//! manifest::schema
//!
//! Wire records of the gallery manifest.
//!
//! # Format
//!
//! The manifest is a flat JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "projectTitle": "Holidays",
//!   "images": [
//!     { "id": "img_1", "name": "a.jpg", "groupId": "default", "order": 0,
//!       "dateAdded": "2024-05-01T10:00:00.000Z", "description": "",
//!       "externalRef": "1AbC", "size": 2048 }
//!   ],
//!   "groups": [
//!     { "id": "default", "name": "Default Group", "order": 0 },
//!     { "id": "password-settings", "name": "Password Settings",
//!       "hashedPassword": "5e88...", "hidden": true }
//!   ]
//! }
//! ```
//!
//! # Compatibility
//!
//! Manifests written by older tools use `driveFileId` for the blob reference
//! and `thumbnailLink` for the display link; both are accepted on read.
//! Keys this crate does not interpret (`path`, `originalName`,
//! `thumbnailUrl`, ...) are kept in [`ImageRecord::extra`] and written back
//! unchanged.
//!
//! # Example
//!
//! ```
//! use gallerist::manifest::schema::ManifestRecord;
//!
//! let json = r#"{
//!     "projectTitle": "Holidays",
//!     "images": [{ "id": "img_1", "name": "a.jpg", "groupId": "default",
//!                  "driveFileId": "1AbC", "size": "2048" }],
//!     "groups": [{ "id": "default", "name": "Default Group", "order": 0 }]
//! }"#;
//!
//! let record: ManifestRecord = serde_json::from_str(json).unwrap();
//! assert_eq!(record.images[0].external_ref, "1AbC");
//! assert_eq!(record.images[0].size, 2048);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::types::{GroupId, ImageId, PASSWORD_SETTINGS_ID};

/// Display name written for the password sentinel.
pub const PASSWORD_SETTINGS_NAME: &str = "Password Settings";

/// Image keys that only ever describe local state and are never persisted.
pub const LOCAL_ONLY_KEYS: &[&str] = &["dataUrl", "tempUrl"];

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    /// Gallery title (absent in some older manifests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,

    /// Every image, in list order
    pub images: Vec<ImageRecord>,

    /// Content groups followed by the password sentinel, if any
    pub groups: Vec<GroupRecord>,
}

/// One persisted image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: ImageId,

    #[serde(default)]
    pub name: String,

    #[serde(default = "GroupId::default_group")]
    pub group_id: GroupId,

    #[serde(default)]
    pub order: u32,

    #[serde(default = "Utc::now")]
    pub date_added: DateTime<Utc>,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "driveFileId")]
    pub external_ref: String,

    #[serde(default, deserialize_with = "size_from_number_or_string")]
    pub size: u64,

    #[serde(
        default,
        alias = "thumbnailLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_link: Option<String>,

    /// Keys not interpreted here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One persisted group record.
///
/// Content groups and the password sentinel share the `groups` array and are
/// told apart by id, so every field other than `id` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: GroupId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl GroupRecord {
    /// Record for a content group.
    pub fn content(id: GroupId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: Some(name.into()),
            order: Some(order),
            hashed_password: None,
            hidden: None,
        }
    }

    /// Record for the password sentinel.
    pub fn sentinel(hashed_password: impl Into<String>) -> Self {
        Self {
            id: GroupId::password_settings(),
            name: Some(PASSWORD_SETTINGS_NAME.to_string()),
            order: None,
            hashed_password: Some(hashed_password.into()),
            hidden: Some(true),
        }
    }

    /// Check if this record is the password sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.id.as_str() == PASSWORD_SETTINGS_ID
    }
}

/// Drive reports sizes as decimal strings; browsers report numbers.
fn size_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
        Missing(Option<()>),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        Size::Text(s) if s.trim().is_empty() => Ok(0),
        Size::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid size '{}'", s))),
        Size::Missing(_) => Ok(0),
    }
}
