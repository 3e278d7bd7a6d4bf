//! viewer::thumbnail
//!
//! Thumbnail URL resolution.
//!
//! # Fallback chain
//!
//! 1. The display link the store issued at load time
//! 2. The local preview of a freshly uploaded image
//! 3. The store's thumbnail endpoint for the blob, full size then small
//! 4. A built-in placeholder
//!
//! A renderer shows the first candidate and moves down the list when one
//! fails to load.

use crate::core::model::Image;

/// Inline SVG shown when nothing else loads.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMjUwIiBoZWlnaHQ9IjIyMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iMTAwJSIgaGVpZ2h0PSIxMDAlIiBmaWxsPSIjZjhmOWZhIiBzdHJva2U9IiNkZGQiIHN0cm9rZS13aWR0aD0iMiIvPjx0ZXh0IHg9IjUwJSIgeT0iNTAlIiBmb250LWZhbWlseT0iQXJpYWwsIHNhbnMtc2VyaWYiIGZvbnQtc2l6ZT0iMTQiIGZpbGw9IiM5OTkiIHRleHQtYW5jaG9yPSJtaWRkbGUiIGR5PSIuM2VtIj5JbWFnZSBub3QgZm91bmQ8L3RleHQ+PC9zdmc+";

const THUMBNAIL_SIZE: &str = "w300-h300";
const SMALL_THUMBNAIL_SIZE: &str = "w150-h150";

fn drive_thumbnail(external_ref: &str, size: &str) -> String {
    format!(
        "https://drive.google.com/thumbnail?id={}&sz={}",
        external_ref, size
    )
}

/// Every URL worth trying for an image, best first. Never empty.
pub fn thumbnail_candidates(image: &Image) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(link) = image.display_link.as_deref().filter(|l| !l.is_empty()) {
        candidates.push(link.to_string());
    }
    if let Some(preview) = &image.preview {
        candidates.push(preview.url());
    }
    if !image.external_ref.is_empty() {
        candidates.push(drive_thumbnail(&image.external_ref, THUMBNAIL_SIZE));
        candidates.push(drive_thumbnail(&image.external_ref, SMALL_THUMBNAIL_SIZE));
    }
    candidates.push(PLACEHOLDER_IMAGE.to_string());
    candidates
}

/// The URL to show first.
pub fn thumbnail_url(image: &Image) -> String {
    // The chain always ends in the placeholder.
    thumbnail_candidates(image)
        .into_iter()
        .next()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LocalPreview;
    use crate::core::types::{GroupId, ImageId};

    fn image(external_ref: &str) -> Image {
        Image::new(
            ImageId::new("img_1").unwrap(),
            "a.jpg",
            GroupId::default_group(),
            external_ref,
            1,
        )
    }

    #[test]
    fn display_link_wins() {
        let img = image("f1")
            .with_display_link("https://lh3.googleusercontent.com/x")
            .with_preview(LocalPreview::from_path("/tmp/a.jpg"));
        assert_eq!(thumbnail_url(&img), "https://lh3.googleusercontent.com/x");
        assert_eq!(thumbnail_candidates(&img).len(), 5);
    }

    #[test]
    fn preview_before_drive_thumbnail() {
        let img = image("f1").with_preview(LocalPreview::from_path("/tmp/a.jpg"));
        assert_eq!(thumbnail_url(&img), "file:///tmp/a.jpg");
    }

    #[test]
    fn drive_thumbnail_from_external_ref() {
        let img = image("f1");
        assert_eq!(
            thumbnail_candidates(&img),
            vec![
                "https://drive.google.com/thumbnail?id=f1&sz=w300-h300".to_string(),
                "https://drive.google.com/thumbnail?id=f1&sz=w150-h150".to_string(),
                PLACEHOLDER_IMAGE.to_string(),
            ]
        );
    }

    #[test]
    fn placeholder_as_last_resort() {
        let mut img = image("");
        img.display_link = Some(String::new());
        assert_eq!(thumbnail_url(&img), PLACEHOLDER_IMAGE);
    }
}
