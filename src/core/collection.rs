//! core::collection
//!
//! The ordered two-level collection: groups containing images.
//!
//! # Ownership
//!
//! A [`Collection`] exclusively owns its groups and images. Images refer to
//! their group by id; a dangling reference is never left behind because
//! deleting a group moves its images to the default group first.
//!
//! # Ordering
//!
//! - Images: the position in the image list is authoritative. The `order`
//!   field is a cache of that position within the image's group, rewritten by
//!   [`order::renumber`](super::order::renumber) after every structural change.
//! - Groups: the group list is kept sorted by `order`, and `order` is always
//!   the group's index in that list.
//!
//! The password sentinel is not stored among the groups at all; it lives in
//! [`Collection::access`] so no ordering or iteration code can trip over it.
//!
//! # Example
//!
//! ```
//! use gallerist::core::collection::Collection;
//! use gallerist::core::model::Image;
//! use gallerist::core::types::{GroupId, ImageId};
//!
//! let mut collection = Collection::new();
//! let trips = collection.add_group("Trips").unwrap();
//!
//! let image = Image::new(ImageId::new("a").unwrap(), "a.jpg", trips.clone(), "blob-a", 10);
//! collection.insert_image(image).unwrap();
//!
//! assert_eq!(collection.images_in_group(&trips).len(), 1);
//! ```

use thiserror::Error;

use super::model::{AccessSettings, Group, Image};
use super::order;
use super::types::{GroupId, ImageId, DEFAULT_GROUP_NAME};

/// Title given to a new collection.
pub const DEFAULT_PROJECT_TITLE: &str = "My Gallery";

/// Errors from collection operations.
///
/// Every failing operation leaves the collection exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("image not found: {0}")]
    ImageNotFound(ImageId),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("an image with id '{0}' already exists")]
    DuplicateImageId(ImageId),

    #[error("a group with id '{0}' already exists")]
    DuplicateGroupId(GroupId),

    #[error("a group named '{0}' already exists")]
    DuplicateGroupName(String),

    #[error("group name cannot be empty")]
    EmptyGroupName,

    #[error("project title cannot be empty")]
    EmptyTitle,

    #[error("group '{0}' cannot be deleted or reordered")]
    ProtectedGroup(GroupId),
}

impl CollectionError {
    /// Check if the error only reports a missing id.
    ///
    /// These are treated as skips by interactive callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CollectionError::ImageNotFound(_) | CollectionError::GroupNotFound(_)
        )
    }
}

/// Groups and images of one gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub(crate) title: String,
    pub(crate) groups: Vec<Group>,
    pub(crate) images: Vec<Image>,
    pub(crate) access: Option<AccessSettings>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Create an empty collection holding only the default group.
    pub fn new() -> Self {
        Self {
            title: DEFAULT_PROJECT_TITLE.to_string(),
            groups: vec![Group::new(GroupId::default_group(), DEFAULT_GROUP_NAME, 0)],
            images: Vec::new(),
            access: None,
        }
    }

    /// Assemble a collection from hydrated parts.
    ///
    /// Groups are sorted by their stored order and the default group is
    /// appended if it is missing. Images of each group are put into stored
    /// order (keeping the slots each group occupies in the list), orphaned
    /// images are moved to the default group, and everything is renumbered
    /// densely. For parts produced by a consistent collection this is the
    /// identity.
    ///
    /// # Errors
    ///
    /// - `DuplicateGroupId` / `DuplicateImageId` on repeated ids
    /// - `DuplicateGroupName` if two groups share a name
    /// - `ProtectedGroup` if a content group uses the sentinel id
    pub fn from_parts(
        title: impl Into<String>,
        mut groups: Vec<Group>,
        images: Vec<Image>,
        access: Option<AccessSettings>,
    ) -> Result<Self, CollectionError> {
        for (i, group) in groups.iter().enumerate() {
            if group.id.is_sentinel() {
                return Err(CollectionError::ProtectedGroup(group.id.clone()));
            }
            if groups[..i].iter().any(|g| g.id == group.id) {
                return Err(CollectionError::DuplicateGroupId(group.id.clone()));
            }
            if groups[..i].iter().any(|g| g.name == group.name) {
                return Err(CollectionError::DuplicateGroupName(group.name.clone()));
            }
        }
        for (i, image) in images.iter().enumerate() {
            if images[..i].iter().any(|img| img.id == image.id) {
                return Err(CollectionError::DuplicateImageId(image.id.clone()));
            }
        }

        groups.sort_by_key(|g| g.order);

        let mut title = title.into();
        if title.trim().is_empty() {
            title = DEFAULT_PROJECT_TITLE.to_string();
        }

        let mut collection = Self {
            title,
            groups,
            images,
            access,
        };
        collection.ensure_default_group();

        let orphans: Vec<usize> = collection
            .images
            .iter()
            .enumerate()
            .filter(|(_, img)| collection.group(&img.group_id).is_none())
            .map(|(i, _)| i)
            .collect();
        if !orphans.is_empty() {
            tracing::warn!(
                count = orphans.len(),
                "reassigning images with unknown groups to the default group"
            );
            for i in orphans {
                collection.images[i].group_id = GroupId::default_group();
            }
        }

        collection.sort_images_within_groups();
        order::renumber_groups(&mut collection);
        order::renumber_all(&mut collection);
        Ok(collection)
    }

    /// Put each group's images into stored-order sequence without moving
    /// them between the list slots that group occupies.
    fn sort_images_within_groups(&mut self) {
        let group_ids: Vec<GroupId> = self.groups.iter().map(|g| g.id.clone()).collect();
        for group_id in group_ids {
            let slots: Vec<usize> = self
                .images
                .iter()
                .enumerate()
                .filter(|(_, img)| img.group_id == group_id)
                .map(|(i, _)| i)
                .collect();
            let mut members: Vec<Image> = slots.iter().map(|&i| self.images[i].clone()).collect();
            members.sort_by_key(|img| img.order);
            for (slot, image) in slots.into_iter().zip(members) {
                self.images[slot] = image;
            }
        }
    }

    /// Add the default group at the end if it is missing.
    ///
    /// If another group already uses the default name, a numbered variant is
    /// used so names stay unique.
    fn ensure_default_group(&mut self) {
        if self.group(&GroupId::default_group()).is_some() {
            return;
        }
        let mut name = DEFAULT_GROUP_NAME.to_string();
        let mut n = 2;
        while self.group_by_name(&name).is_some() {
            name = format!("{} ({})", DEFAULT_GROUP_NAME, n);
            n += 1;
        }
        tracing::warn!(name = %name, "collection has no default group, adding one");
        let order = self.groups.len() as u32;
        self.groups.push(Group::new(GroupId::default_group(), name, order));
    }

    // ---------------------------------------------------------------------
    // Title
    // ---------------------------------------------------------------------

    /// Get the project title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the project title (trimmed).
    pub fn set_title(&mut self, title: &str) -> Result<(), CollectionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CollectionError::EmptyTitle);
        }
        self.title = title.to_string();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Groups
    // ---------------------------------------------------------------------

    /// Content groups in display order. Never includes the sentinel.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Look up a content group.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Look up a content group by its display name.
    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Resolve a user-supplied group reference (id first, then name).
    pub fn resolve_group(&self, reference: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.id.as_str() == reference)
            .or_else(|| self.group_by_name(reference))
    }

    /// Add a group with a generated id at the end of the group order.
    pub fn add_group(&mut self, name: &str) -> Result<GroupId, CollectionError> {
        let id = GroupId::generate();
        self.insert_group(id.clone(), name)?;
        Ok(id)
    }

    /// Add a group with an explicit id at the end of the group order.
    ///
    /// # Errors
    ///
    /// - `EmptyGroupName` if the trimmed name is empty
    /// - `DuplicateGroupName` if another group already uses the name
    /// - `DuplicateGroupId` if the id is taken
    /// - `ProtectedGroup` if the id is the password sentinel
    pub fn insert_group(&mut self, id: GroupId, name: &str) -> Result<(), CollectionError> {
        let name = name.trim();
        if id.is_sentinel() {
            return Err(CollectionError::ProtectedGroup(id));
        }
        if name.is_empty() {
            return Err(CollectionError::EmptyGroupName);
        }
        if self.group(&id).is_some() {
            return Err(CollectionError::DuplicateGroupId(id));
        }
        if self.group_by_name(name).is_some() {
            return Err(CollectionError::DuplicateGroupName(name.to_string()));
        }

        let order = self.groups.len() as u32;
        tracing::debug!(group = %id, name, order, "adding group");
        self.groups.push(Group::new(id, name, order));
        order::renumber_groups(self);
        Ok(())
    }

    /// Rename a content group.
    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> Result<(), CollectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollectionError::EmptyGroupName);
        }
        if self.groups.iter().any(|g| g.name == name && &g.id != id) {
            return Err(CollectionError::DuplicateGroupName(name.to_string()));
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| CollectionError::GroupNotFound(id.clone()))?;
        group.name = name.to_string();
        Ok(())
    }

    /// Delete a content group, moving its images to the default group.
    ///
    /// Moved images keep their list positions, so they interleave with the
    /// default group's images by where they sat in the list.
    ///
    /// # Errors
    ///
    /// - `ProtectedGroup` for the default group or the sentinel
    /// - `GroupNotFound` if no such group exists
    pub fn delete_group(&mut self, id: &GroupId) -> Result<Group, CollectionError> {
        if id.is_default() || id.is_sentinel() {
            return Err(CollectionError::ProtectedGroup(id.clone()));
        }
        let index = self
            .groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| CollectionError::GroupNotFound(id.clone()))?;

        self.ensure_default_group();
        let mut moved = 0usize;
        for image in self.images.iter_mut().filter(|img| &img.group_id == id) {
            image.group_id = GroupId::default_group();
            moved += 1;
        }

        let group = self.groups.remove(index);
        tracing::debug!(group = %id, moved, "deleted group");
        order::renumber_groups(self);
        order::renumber(self, &GroupId::default_group());
        Ok(group)
    }

    // ---------------------------------------------------------------------
    // Images
    // ---------------------------------------------------------------------

    /// All images in list order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Look up an image.
    pub fn image(&self, id: &ImageId) -> Option<&Image> {
        self.images.iter().find(|img| &img.id == id)
    }

    /// Images of a group sorted by their order.
    pub fn images_in_group(&self, group_id: &GroupId) -> Vec<&Image> {
        let mut images: Vec<&Image> = self
            .images
            .iter()
            .filter(|img| &img.group_id == group_id)
            .collect();
        images.sort_by_key(|img| img.order);
        images
    }

    /// Order a new image appended to the group would receive.
    pub fn next_order_in(&self, group_id: &GroupId) -> u32 {
        self.images
            .iter()
            .filter(|img| &img.group_id == group_id)
            .map(|img| img.order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check if any image is backed by the given blob.
    pub fn contains_external_ref(&self, external_ref: &str) -> bool {
        self.images.iter().any(|img| img.external_ref == external_ref)
    }

    /// Insert an image at the end of its group.
    ///
    /// # Errors
    ///
    /// - `DuplicateImageId` if the id is taken
    /// - `GroupNotFound` if the image's group does not exist
    pub fn insert_image(&mut self, mut image: Image) -> Result<(), CollectionError> {
        if self.image(&image.id).is_some() {
            return Err(CollectionError::DuplicateImageId(image.id));
        }
        if self.group(&image.group_id).is_none() {
            return Err(CollectionError::GroupNotFound(image.group_id));
        }

        image.order = self.next_order_in(&image.group_id);
        let group_id = image.group_id.clone();
        tracing::debug!(image = %image.id, group = %group_id, order = image.order, "inserting image");
        self.images.push(image);
        order::renumber(self, &group_id);
        Ok(())
    }

    /// Remove an image and close the gap it leaves in its group.
    pub fn remove_image(&mut self, id: &ImageId) -> Result<Image, CollectionError> {
        let index = self
            .images
            .iter()
            .position(|img| &img.id == id)
            .ok_or_else(|| CollectionError::ImageNotFound(id.clone()))?;
        let image = self.images.remove(index);
        tracing::debug!(image = %id, group = %image.group_id, "removed image");
        order::renumber(self, &image.group_id);
        Ok(image)
    }

    /// Replace an image's caption.
    pub fn set_description(
        &mut self,
        id: &ImageId,
        description: &str,
    ) -> Result<(), CollectionError> {
        let image = self
            .images
            .iter_mut()
            .find(|img| &img.id == id)
            .ok_or_else(|| CollectionError::ImageNotFound(id.clone()))?;
        image.description = description.to_string();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Access control
    // ---------------------------------------------------------------------

    /// Access settings, if password protection is enabled.
    pub fn access(&self) -> Option<&AccessSettings> {
        self.access.as_ref()
    }

    /// Check if the gallery is password protected.
    pub fn is_protected(&self) -> bool {
        self.access.is_some()
    }

    /// Enable protection or replace the stored hash.
    pub fn set_password_hash(&mut self, hashed_password: impl Into<String>) {
        self.access = Some(AccessSettings {
            hashed_password: hashed_password.into(),
        });
    }

    /// Disable protection. Returns whether it was enabled.
    pub fn clear_password(&mut self) -> bool {
        self.access.take().is_some()
    }
}
