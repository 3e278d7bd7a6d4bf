//! viewer::folder
//!
//! What a visitor sees of a folder, not just of its manifest.
//!
//! Images in the folder that the manifest does not reference are still shown,
//! at the end of the default group in listing order. A folder without a
//! manifest shows every image it holds under [`FOLDER_GROUP_NAME`]. The
//! merged collection is for display only and is never saved.

use chrono::Utc;

use crate::core::collection::Collection;
use crate::core::model::Image;
use crate::core::types::{GroupId, ImageId};
use crate::store::RemoteFile;

/// Default group name for a folder that has no manifest.
pub const FOLDER_GROUP_NAME: &str = "Google Drive Images";

/// Id prefix of images that only exist in the listing.
pub const UNLISTED_ID_PREFIX: &str = "drive_";

/// Copy of `collection` with the unreferenced listing entries appended to
/// the default group.
pub fn merge_listing(collection: &Collection, listing: &[RemoteFile]) -> Collection {
    let mut merged = collection.clone();
    let mut added = 0usize;
    for file in listing {
        if merged.contains_external_ref(&file.id) {
            continue;
        }
        let Some(image) = unlisted_image(file) else {
            tracing::debug!(file = %file.id, "listing entry has no usable id, skipping");
            continue;
        };
        match merged.insert_image(image) {
            Ok(()) => added += 1,
            Err(err) => tracing::debug!(file = %file.id, error = %err, "not shown"),
        }
    }
    if added > 0 {
        tracing::info!(count = added, "showing folder images missing from the manifest");
    }
    merged
}

/// The collection shown for a folder that has no manifest.
pub fn folder_only(title: &str, listing: &[RemoteFile]) -> Collection {
    let mut collection = crate::manifest::fresh_collection(title);
    if let Err(err) = collection.rename_group(&GroupId::default_group(), FOLDER_GROUP_NAME) {
        tracing::debug!(error = %err, "keeping default group name");
    }
    merge_listing(&collection, listing)
}

fn unlisted_image(file: &RemoteFile) -> Option<Image> {
    let id = ImageId::new(format!("{}{}", UNLISTED_ID_PREFIX, file.id)).ok()?;
    let mut image = Image::new(id, &file.name, GroupId::default_group(), &file.id, file.size)
        .with_date_added(file.created_time.unwrap_or_else(Utc::now));
    if let Some(link) = &file.display_link {
        image = image.with_display_link(link);
    }
    Some(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str, name: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: name.to_string(),
            size: 5,
            mime_type: "image/jpeg".to_string(),
            created_time: None,
            display_link: Some(format!("https://thumb/{}", id)),
        }
    }

    fn managed() -> Collection {
        let mut c = Collection::new();
        let trips = c.add_group("Trips").unwrap();
        c.insert_image(Image::new(ImageId::new("img_1").unwrap(), "a.jpg", trips, "f1", 1))
            .unwrap();
        c
    }

    #[test]
    fn unreferenced_files_join_default_group() {
        let c = managed();
        let listing = vec![remote("f1", "a.jpg"), remote("f2", "b.png"), remote("f3", "c.gif")];
        let merged = merge_listing(&c, &listing);

        assert_eq!(merged.images().len(), 3);
        let default: Vec<&str> = merged
            .images_in_group(&GroupId::default_group())
            .iter()
            .map(|img| img.name.as_str())
            .collect();
        assert_eq!(default, vec!["b.png", "c.gif"]);
        let extra = merged.image(&ImageId::new("drive_f2").unwrap()).unwrap();
        assert_eq!(extra.display_link.as_deref(), Some("https://thumb/f2"));
    }

    #[test]
    fn source_collection_untouched() {
        let c = managed();
        let before = c.clone();
        merge_listing(&c, &[remote("f2", "b.png")]);
        assert_eq!(c, before);
    }

    #[test]
    fn manifest_entries_missing_from_listing_stay() {
        let c = managed();
        let merged = merge_listing(&c, &[]);
        assert_eq!(merged, c);
    }

    #[test]
    fn folder_without_manifest_shows_everything() {
        let listing = vec![remote("f1", "a.jpg"), remote("f2", "b.png")];
        let c = folder_only("Shared", &listing);

        assert_eq!(c.title(), "Shared");
        assert_eq!(c.groups().len(), 1);
        assert_eq!(c.groups()[0].name, FOLDER_GROUP_NAME);
        let names: Vec<&str> = c.images().iter().map(|img| img.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }
}
