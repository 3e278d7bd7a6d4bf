//! manifest::codec
//!
//! Conversion between a [`Collection`] and its manifest record.
//!
//! # Loading
//!
//! A load merges two sources: the persisted manifest, which holds structure
//! and metadata, and a fresh listing of the storage folder, which holds
//! display links that the store reissues over time. Images are matched to
//! listing entries by external reference; only the display link is taken
//! from the listing.
//!
//! # Saving
//!
//! Local-only state (previews, `dataUrl`, `tempUrl`) is dropped. The
//! password sentinel is written after the content groups.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::schema::{GroupRecord, ImageRecord, ManifestRecord, LOCAL_ONLY_KEYS};
use crate::core::collection::{Collection, CollectionError};
use crate::core::model::{AccessSettings, Group, Image};
use crate::store::RemoteFile;

/// Legacy key holding a second copy of the display link.
const LEGACY_THUMBNAIL_URL_KEY: &str = "thumbnailUrl";

/// Errors from manifest encoding and decoding.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is malformed, incomplete, or inconsistent.
    #[error("invalid manifest: {0}")]
    Format(String),

    /// The collection could not be encoded.
    #[error("failed to encode manifest: {0}")]
    Encode(String),
}

impl From<CollectionError> for ManifestError {
    fn from(err: CollectionError) -> Self {
        ManifestError::Format(err.to_string())
    }
}

/// Build the manifest record of a collection.
pub fn serialize(collection: &Collection) -> ManifestRecord {
    let images = collection.images().iter().map(image_record).collect();

    let mut groups: Vec<GroupRecord> = collection
        .groups()
        .iter()
        .map(|g| GroupRecord::content(g.id.clone(), g.name.clone(), g.order))
        .collect();
    if let Some(access) = collection.access() {
        groups.push(GroupRecord::sentinel(access.hashed_password.clone()));
    }

    ManifestRecord {
        project_title: Some(collection.title().to_string()),
        images,
        groups,
    }
}

fn image_record(image: &Image) -> ImageRecord {
    let mut extra = image.extra.clone();
    for key in LOCAL_ONLY_KEYS {
        extra.remove(*key);
    }
    ImageRecord {
        id: image.id.clone(),
        name: image.name.clone(),
        group_id: image.group_id.clone(),
        order: image.order,
        date_added: image.date_added,
        description: image.description.clone(),
        external_ref: image.external_ref.clone(),
        size: image.size,
        display_link: image.display_link.clone(),
        extra,
    }
}

/// Encode a collection as pretty-printed JSON (two-space indent).
///
/// # Errors
///
/// Returns `ManifestError::Encode` if serialization fails.
pub fn to_json(collection: &Collection) -> Result<String, ManifestError> {
    serde_json::to_string_pretty(&serialize(collection))
        .map_err(|e| ManifestError::Encode(e.to_string()))
}

/// Parse manifest JSON.
///
/// # Errors
///
/// Returns `ManifestError::Format` for malformed JSON, a missing `images` or
/// `groups` array, or values of the wrong type.
pub fn parse(json: &str) -> Result<ManifestRecord, ManifestError> {
    serde_json::from_str(json).map_err(|e| ManifestError::Format(e.to_string()))
}

/// Rebuild a collection from a record, overlaying display links from a fresh
/// listing of the storage folder.
///
/// Images without a listing entry are kept unchanged.
///
/// # Errors
///
/// Returns `ManifestError::Format` for duplicate ids or a content group
/// without a name.
pub fn deserialize(
    record: ManifestRecord,
    listing: &[RemoteFile],
) -> Result<Collection, ManifestError> {
    let fresh: HashMap<&str, &RemoteFile> =
        listing.iter().map(|file| (file.id.as_str(), file)).collect();

    let mut access = None;
    let mut groups = Vec::new();
    for (index, group) in record.groups.into_iter().enumerate() {
        if group.is_sentinel() {
            match group.hashed_password {
                Some(hash) if !hash.is_empty() => {
                    access = Some(AccessSettings {
                        hashed_password: hash,
                    })
                }
                _ => tracing::warn!("ignoring password settings without a hash"),
            }
            continue;
        }
        let name = group
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ManifestError::Format(format!("group '{}' has no name", group.id)))?;
        let order = group.order.unwrap_or(index as u32);
        groups.push(Group::new(group.id, name, order));
    }

    let mut refreshed = 0usize;
    let images = record
        .images
        .into_iter()
        .map(|stored| {
            let mut image = Image {
                id: stored.id,
                name: stored.name,
                group_id: stored.group_id,
                order: stored.order,
                date_added: stored.date_added,
                description: stored.description,
                external_ref: stored.external_ref,
                size: stored.size,
                display_link: stored.display_link,
                extra: stored.extra,
                preview: None,
            };
            if let Some(link) = fresh
                .get(image.external_ref.as_str())
                .and_then(|file| file.display_link.as_ref())
            {
                image.display_link = Some(link.clone());
                if image.extra.contains_key(LEGACY_THUMBNAIL_URL_KEY) {
                    image
                        .extra
                        .insert(LEGACY_THUMBNAIL_URL_KEY.to_string(), Value::String(link.clone()));
                }
                refreshed += 1;
            }
            image
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        images = images.len(),
        groups = groups.len(),
        refreshed,
        protected = access.is_some(),
        "decoded manifest"
    );

    let title = record.project_title.unwrap_or_default();
    Ok(Collection::from_parts(title, groups, images, access)?)
}

/// Parse and decode a manifest, falling back to a fresh collection titled
/// `default_title` when the manifest is unusable.
pub fn load_or_default(json: &str, listing: &[RemoteFile], default_title: &str) -> Collection {
    match parse(json).and_then(|record| deserialize(record, listing)) {
        Ok(collection) => collection,
        Err(err) => {
            tracing::warn!(error = %err, "manifest unusable, starting fresh");
            fresh_collection(default_title)
        }
    }
}

/// An empty collection with the given title (or the built-in default when
/// the title is blank).
pub fn fresh_collection(title: &str) -> Collection {
    let mut collection = Collection::new();
    if collection.set_title(title).is_err() {
        tracing::debug!("blank default title, keeping built-in title");
    }
    collection
}
