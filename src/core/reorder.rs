//! core::reorder
//!
//! Drag-and-drop moves for images and groups.
//!
//! # Image moves
//!
//! An image is lifted out of the list, given its destination group, and
//! spliced back next to the drop target (or after the destination group's
//! last image when dropped on the group itself). Both affected groups are
//! renumbered before returning.
//!
//! # Group moves
//!
//! Groups can be addressed two ways: relative to another group, or relative to
//! an absolute order value (a drop on the gap marker rendered between two
//! groups). Both modes work on the same sequence: the content groups in order
//! with the dragged group removed. They only differ in how the insertion index
//! into that sequence is found, and both finish by writing `order = index`, so
//! the result is always dense and matches list order.
//!
//! # Example
//!
//! ```
//! use gallerist::core::collection::Collection;
//! use gallerist::core::reorder::{move_group, MoveOutcome};
//! use gallerist::core::types::{GroupId, GroupTarget, Position};
//!
//! let mut collection = Collection::new();
//! let trips = collection.add_group("Trips").unwrap();
//!
//! let outcome = move_group(
//!     &mut collection,
//!     &trips,
//!     &GroupTarget::Group(GroupId::default_group()),
//!     Position::Before,
//! )
//! .unwrap();
//!
//! assert_eq!(outcome, MoveOutcome::Moved);
//! assert_eq!(collection.groups()[0].id, trips);
//! ```

use super::collection::{Collection, CollectionError};
use super::order::renumber;
use super::types::{GroupId, GroupTarget, ImageId, Position};

/// Result of a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The request was a no-op (dropped onto itself)
    Unchanged,
    /// The item was moved
    Moved,
}

/// Move an image next to a target image, or to the end of a group.
///
/// # Arguments
///
/// * `image_id` - The image being dragged
/// * `target_image_id` - The image it was dropped on, if any
/// * `target_group_id` - The group it lands in
/// * `position` - Whether it lands before or after the target image
///
/// A target image that no longer exists is tolerated: the image is appended
/// at the end of the list instead.
///
/// # Errors
///
/// - `ImageNotFound` if the dragged image does not exist
/// - `GroupNotFound` if the destination group does not exist
///
/// Nothing is changed when an error is returned.
pub fn move_image(
    collection: &mut Collection,
    image_id: &ImageId,
    target_image_id: Option<&ImageId>,
    target_group_id: &GroupId,
    position: Position,
) -> Result<MoveOutcome, CollectionError> {
    let from = collection
        .images
        .iter()
        .position(|img| &img.id == image_id)
        .ok_or_else(|| CollectionError::ImageNotFound(image_id.clone()))?;
    if target_image_id == Some(image_id) {
        return Ok(MoveOutcome::Unchanged);
    }
    if collection.group(target_group_id).is_none() {
        return Err(CollectionError::GroupNotFound(target_group_id.clone()));
    }

    let mut image = collection.images.remove(from);
    let origin = std::mem::replace(&mut image.group_id, target_group_id.clone());

    let insert_at = match target_image_id {
        Some(target) => match collection.images.iter().position(|img| &img.id == target) {
            Some(index) => match position {
                Position::Before => index,
                Position::After => index + 1,
            },
            None => {
                tracing::debug!(target = %target, "drop target vanished, appending");
                collection.images.len()
            }
        },
        None => collection
            .images
            .iter()
            .rposition(|img| &img.group_id == target_group_id)
            .map(|last| last + 1)
            .unwrap_or(collection.images.len()),
    };

    tracing::debug!(
        image = %image_id,
        from = %origin,
        to = %target_group_id,
        index = insert_at,
        "moving image"
    );
    collection.images.insert(insert_at, image);

    renumber(collection, &origin);
    if &origin != target_group_id {
        renumber(collection, target_group_id);
    }
    Ok(MoveOutcome::Moved)
}

/// Move a group relative to another group or to an absolute order.
///
/// # Errors
///
/// - `ProtectedGroup` if the sentinel is dragged or targeted
/// - `GroupNotFound` if the dragged or target group does not exist
///
/// Nothing is changed when an error is returned.
pub fn move_group(
    collection: &mut Collection,
    dragged_id: &GroupId,
    target: &GroupTarget,
    position: Position,
) -> Result<MoveOutcome, CollectionError> {
    if dragged_id.is_sentinel() {
        return Err(CollectionError::ProtectedGroup(dragged_id.clone()));
    }
    let from = collection
        .groups
        .iter()
        .position(|g| &g.id == dragged_id)
        .ok_or_else(|| CollectionError::GroupNotFound(dragged_id.clone()))?;

    if let GroupTarget::Group(target_id) = target {
        if target_id.is_sentinel() {
            return Err(CollectionError::ProtectedGroup(target_id.clone()));
        }
        if collection.group(target_id).is_none() {
            return Err(CollectionError::GroupNotFound(target_id.clone()));
        }
        if target_id == dragged_id {
            return Ok(MoveOutcome::Unchanged);
        }
    }

    // The group list is sorted by order, so it already is the visible sequence.
    let dragged = collection.groups.remove(from);
    let remaining = &collection.groups;

    let insert_at = match target {
        GroupTarget::Group(target_id) => {
            let index = remaining
                .iter()
                .position(|g| &g.id == target_id)
                .unwrap_or(remaining.len());
            match position {
                Position::Before => index,
                Position::After => (index + 1).min(remaining.len()),
            }
        }
        GroupTarget::Order(target_order) => {
            let found = match position {
                Position::Before => remaining.iter().position(|g| g.order >= *target_order),
                Position::After => remaining.iter().position(|g| g.order > *target_order),
            };
            found.unwrap_or(remaining.len())
        }
    };

    tracing::debug!(group = %dragged_id, target = %target, %position, index = insert_at, "moving group");
    collection.groups.insert(insert_at, dragged);

    // List position is the new truth; stored orders are stale until rewritten.
    for (index, group) in collection.groups.iter_mut().enumerate() {
        group.order = index as u32;
    }

    let outcome = if insert_at == from {
        MoveOutcome::Unchanged
    } else {
        MoveOutcome::Moved
    };
    Ok(outcome)
}
