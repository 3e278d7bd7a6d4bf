//! viewer::gallery
//!
//! The sections a visitor sees.
//!
//! Content groups appear in group order, each with its images in image
//! order. Groups without images are left out. The password sentinel is never
//! a group, so it cannot appear here.
//!
//! # Example
//!
//! ```
//! use gallerist::core::collection::Collection;
//! use gallerist::core::model::Image;
//! use gallerist::core::types::{GroupId, ImageId};
//! use gallerist::viewer::GalleryView;
//!
//! let mut collection = Collection::new();
//! let trips = collection.add_group("Summer Trips").unwrap();
//! let image = Image::new(ImageId::new("a").unwrap(), "a.jpg", trips, "blob-a", 10);
//! collection.insert_image(image).unwrap();
//!
//! let view = GalleryView::new(&collection);
//! assert_eq!(view.sections().len(), 1);
//! assert_eq!(view.search("summer").len(), 1);
//! ```

use crate::core::collection::Collection;
use crate::core::model::{Group, Image};
use crate::core::types::ImageId;

use super::lightbox::Lightbox;

/// A group and its images, in display order.
#[derive(Debug, Clone)]
pub struct GroupSection<'a> {
    pub group: &'a Group,
    pub images: Vec<&'a Image>,
}

/// What a visitor sees of a collection.
#[derive(Debug, Clone)]
pub struct GalleryView<'a> {
    title: &'a str,
    sections: Vec<GroupSection<'a>>,
}

impl<'a> GalleryView<'a> {
    /// Build the view of a collection.
    pub fn new(collection: &'a Collection) -> Self {
        let sections = collection
            .groups()
            .iter()
            .filter_map(|group| {
                let images = collection.images_in_group(&group.id);
                (!images.is_empty()).then_some(GroupSection { group, images })
            })
            .collect();

        Self {
            title: collection.title(),
            sections,
        }
    }

    /// Gallery title.
    pub fn title(&self) -> &str {
        self.title
    }

    /// Non-empty groups in order.
    pub fn sections(&self) -> &[GroupSection<'a>] {
        &self.sections
    }

    /// Check if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of images shown.
    pub fn image_count(&self) -> usize {
        self.sections.iter().map(|s| s.images.len()).sum()
    }

    /// Counter line, e.g. "3 images found".
    pub fn counter_label(&self) -> String {
        let count = self.image_count();
        format!("{} image{} found", count, if count == 1 { "" } else { "s" })
    }

    /// Sections whose group name contains `term`, ignoring case.
    ///
    /// An empty or blank term matches every section.
    pub fn search(&self, term: &str) -> Vec<&GroupSection<'a>> {
        let needle = term.trim().to_lowercase();
        self.sections
            .iter()
            .filter(|s| needle.is_empty() || s.group.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// All shown images, section by section.
    pub fn flattened(&self) -> Vec<&'a Image> {
        self.sections
            .iter()
            .flat_map(|s| s.images.iter().copied())
            .collect()
    }

    /// Position of an image in [`flattened`](Self::flattened) order.
    pub fn position_of(&self, id: &ImageId) -> Option<usize> {
        self.flattened().iter().position(|img| &img.id == id)
    }

    /// Lightbox over every shown image.
    pub fn lightbox(&self) -> Lightbox<'a> {
        Lightbox::new(self.flattened())
    }
}
