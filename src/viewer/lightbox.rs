//! viewer::lightbox
//!
//! Full-size navigation over the gallery's images in display order. The
//! cursor stops at the first and last image.

use crate::core::model::Image;
use crate::core::types::ImageId;

/// Cursor over a fixed list of images.
#[derive(Debug, Clone)]
pub struct Lightbox<'a> {
    images: Vec<&'a Image>,
    current: usize,
}

impl<'a> Lightbox<'a> {
    /// Lightbox positioned on the first image.
    pub fn new(images: Vec<&'a Image>) -> Self {
        Self { images, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Jump to a position. Out-of-range positions are ignored.
    pub fn open(&mut self, index: usize) -> Option<&'a Image> {
        if index < self.images.len() {
            self.current = index;
        }
        self.current()
    }

    /// Jump to an image by id.
    pub fn open_image(&mut self, id: &ImageId) -> Option<&'a Image> {
        let index = self.images.iter().position(|img| &img.id == id)?;
        self.open(index)
    }

    /// The image shown, if any.
    pub fn current(&self) -> Option<&'a Image> {
        self.images.get(self.current).copied()
    }

    /// Zero-based position of the image shown.
    pub fn index(&self) -> usize {
        self.current
    }

    /// Advance one image. Returns `None` and stays put on the last image.
    pub fn next(&mut self) -> Option<&'a Image> {
        if self.current + 1 >= self.images.len() {
            return None;
        }
        self.current += 1;
        self.current()
    }

    /// Go back one image. Returns `None` and stays put on the first image.
    pub fn prev(&mut self) -> Option<&'a Image> {
        if self.current == 0 || self.images.is_empty() {
            return None;
        }
        self.current -= 1;
        self.current()
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.images.len()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0 && !self.images.is_empty()
    }

    /// Caption for the image shown: `"<name> (i of n)"`, then the
    /// description on its own line when there is one.
    pub fn caption(&self) -> Option<String> {
        let image = self.current()?;
        let mut caption = format!(
            "{} ({} of {})",
            display_name(image),
            self.current + 1,
            self.images.len()
        );
        let description = image.description.trim();
        if !description.is_empty() {
            caption.push('\n');
            caption.push_str(description);
        }
        Some(caption)
    }
}

/// Name shown for an image, falling back to "Image".
pub fn display_name(image: &Image) -> &str {
    let name = image.name.trim();
    if name.is_empty() {
        "Image"
    } else {
        name
    }
}

/// Link opening the full image in the store's web viewer.
pub fn full_view_url(image: &Image) -> String {
    format!("https://drive.google.com/file/d/{}/view", image.external_ref)
}
