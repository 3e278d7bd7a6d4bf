//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ImageId`] - Stable identifier of an image within a collection
//! - [`GroupId`] - Identifier of a group (including the reserved ids)
//! - [`Position`] - Drop position relative to a drag target
//! - [`GroupTarget`] - Addressing mode for a group move
//!
//! # Validation
//!
//! Identifiers cannot be empty or padded with whitespace. Invalid values
//! cannot be represented, so a manifest with a blank id fails at parse time
//! rather than producing an unreachable image.
//!
//! # Examples
//!
//! ```
//! use gallerist::core::types::{GroupId, ImageId, Position};
//!
//! let group = GroupId::new("g2").unwrap();
//! assert!(!group.is_default());
//! assert!(GroupId::default_group().is_default());
//!
//! assert!(ImageId::new("").is_err());
//! assert_eq!("before".parse::<Position>().unwrap(), Position::Before);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Id of the group that always exists and receives orphaned images.
pub const DEFAULT_GROUP_ID: &str = "default";

/// Display name given to the default group when a collection is created.
pub const DEFAULT_GROUP_NAME: &str = "Default Group";

/// Id of the pseudo-group carrying access-control metadata.
pub const PASSWORD_SETTINGS_ID: &str = "password-settings";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid image id: {0}")]
    InvalidImageId(String),

    #[error("invalid group id: {0}")]
    InvalidGroupId(String),

    #[error("invalid position '{0}', expected 'before' or 'after'")]
    InvalidPosition(String),
}

fn validate_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("id cannot be empty".into());
    }
    if id.trim() != id {
        return Err(format!("id '{}' has surrounding whitespace", id));
    }
    if id.chars().any(|c| c.is_control()) {
        return Err("id cannot contain control characters".into());
    }
    Ok(())
}

/// Build a fresh id of the form `<prefix>_<unix-millis>_<8 hex digits>`.
fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &suffix[..8])
}

/// Identifier of an image.
///
/// Ids are opaque and stable: they survive moves between groups and
/// round-trips through the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageId(String);

impl ImageId {
    /// Create a validated image id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidImageId` for empty or whitespace-padded ids.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_id(&id).map_err(TypeError::InvalidImageId)?;
        Ok(Self(id))
    }

    /// Generate a new unique-looking id (`img_<millis>_<hex>`).
    pub fn generate() -> Self {
        Self(generate_id("img"))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ImageId> for String {
    fn from(id: ImageId) -> Self {
        id.0
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a group.
///
/// Two ids are reserved: [`DEFAULT_GROUP_ID`] names the group that can never
/// be deleted, and [`PASSWORD_SETTINGS_ID`] names the access-control sentinel
/// which is never a content group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(String);

impl GroupId {
    /// Create a validated group id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGroupId` for empty or whitespace-padded ids.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_id(&id).map_err(TypeError::InvalidGroupId)?;
        Ok(Self(id))
    }

    /// Generate a new id (`group_<millis>_<hex>`).
    pub fn generate() -> Self {
        Self(generate_id("group"))
    }

    /// The id of the default group.
    pub fn default_group() -> Self {
        Self(DEFAULT_GROUP_ID.to_string())
    }

    /// The id of the access-control sentinel.
    pub fn password_settings() -> Self {
        Self(PASSWORD_SETTINGS_ID.to_string())
    }

    /// Check if this is the default group.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GROUP_ID
    }

    /// Check if this is the access-control sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == PASSWORD_SETTINGS_ID
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<GroupId> for String {
    fn from(id: GroupId) -> Self {
        id.0
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a dragged item lands relative to its drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Insert ahead of the target
    Before,
    /// Insert behind the target
    #[default]
    After,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Before => write!(f, "before"),
            Position::After => write!(f, "after"),
        }
    }
}

impl FromStr for Position {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            _ => Err(TypeError::InvalidPosition(s.to_string())),
        }
    }
}

/// Drop target of a group move.
///
/// A drop onto a group header addresses that group; a drop onto a gap marker
/// between groups addresses the `order` value the marker was rendered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    /// Relative to another group's current position
    Group(GroupId),
    /// Relative to an absolute order value
    Order(u32),
}

impl fmt::Display for GroupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupTarget::Group(id) => write!(f, "group '{}'", id),
            GroupTarget::Order(order) => write!(f, "order {}", order),
        }
    }
}
