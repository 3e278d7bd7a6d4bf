//! core::order
//!
//! Order maintenance for the two-level collection.
//!
//! # Invariants
//!
//! After every completed mutation:
//! - the `order` values of the images sharing a group are exactly
//!   `0..count` and follow the images' sequence in the list
//! - the `order` values of the content groups are exactly `0..count` and
//!   follow the group list
//!
//! Transient inconsistency inside a multi-step move is fine; the move
//! renumbers before it returns.

use std::collections::BTreeSet;

use thiserror::Error;

use super::collection::Collection;
use super::types::{GroupId, ImageId};

/// Violations reported by [`check_dense`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("image orders in group '{group}' are not dense: {orders:?}")]
    ImagesNotDense { group: GroupId, orders: Vec<u32> },

    #[error("image orders in group '{0}' do not follow list order")]
    ImagesOutOfSequence(GroupId),

    #[error("group orders are not dense: {0:?}")]
    GroupsNotDense(Vec<u32>),

    #[error("group orders do not follow list order")]
    GroupsOutOfSequence,

    #[error("image '{image}' references unknown group '{group}'")]
    DanglingGroup { image: ImageId, group: GroupId },
}

/// Rewrite the order of one group's images to their index in list order.
pub fn renumber(collection: &mut Collection, group_id: &GroupId) {
    let mut next = 0u32;
    for image in collection
        .images
        .iter_mut()
        .filter(|img| &img.group_id == group_id)
    {
        image.order = next;
        next += 1;
    }
}

/// Renumber every group that owns at least one image.
pub fn renumber_all(collection: &mut Collection) {
    let group_ids: BTreeSet<GroupId> = collection
        .images
        .iter()
        .map(|img| img.group_id.clone())
        .collect();
    for group_id in &group_ids {
        renumber(collection, group_id);
    }
}

/// Sort content groups by current order (stable) and rewrite each order to
/// its index.
pub fn renumber_groups(collection: &mut Collection) {
    collection.groups.sort_by_key(|g| g.order);
    for (index, group) in collection.groups.iter_mut().enumerate() {
        group.order = index as u32;
    }
}

/// Check if a set of order values is exactly `0..n`.
pub fn is_dense<I: IntoIterator<Item = u32>>(orders: I) -> bool {
    let mut values: Vec<u32> = orders.into_iter().collect();
    values.sort_unstable();
    values
        .iter()
        .enumerate()
        .all(|(index, &order)| order == index as u32)
}

/// Verify every ordering invariant of a collection.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_dense(collection: &Collection) -> Result<(), OrderError> {
    for image in &collection.images {
        if collection.group(&image.group_id).is_none() {
            return Err(OrderError::DanglingGroup {
                image: image.id.clone(),
                group: image.group_id.clone(),
            });
        }
    }

    for group in &collection.groups {
        let orders: Vec<u32> = collection
            .images
            .iter()
            .filter(|img| img.group_id == group.id)
            .map(|img| img.order)
            .collect();
        if !is_dense(orders.iter().copied()) {
            return Err(OrderError::ImagesNotDense {
                group: group.id.clone(),
                orders,
            });
        }
        if orders.iter().enumerate().any(|(i, &o)| o != i as u32) {
            return Err(OrderError::ImagesOutOfSequence(group.id.clone()));
        }
    }

    let group_orders: Vec<u32> = collection.groups.iter().map(|g| g.order).collect();
    if !is_dense(group_orders.iter().copied()) {
        return Err(OrderError::GroupsNotDense(group_orders));
    }
    if group_orders.iter().enumerate().any(|(i, &o)| o != i as u32) {
        return Err(OrderError::GroupsOutOfSequence);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Group, Image};

    fn gid(id: &str) -> GroupId {
        GroupId::new(id).unwrap()
    }

    fn image(id: &str, group: &str, order: u32) -> Image {
        let mut img = Image::new(ImageId::new(id).unwrap(), id, gid(group), id, 1);
        img.order = order;
        img
    }

    fn raw(groups: Vec<Group>, images: Vec<Image>) -> Collection {
        Collection {
            title: "T".into(),
            groups,
            images,
            access: None,
        }
    }

    #[test]
    fn is_dense_cases() {
        assert!(is_dense(Vec::<u32>::new()));
        assert!(is_dense([0]));
        assert!(is_dense([2, 0, 1]));
        assert!(!is_dense([1]));
        assert!(!is_dense([0, 0]));
        assert!(!is_dense([0, 2]));
    }

    #[test]
    fn renumber_uses_list_order_not_stored_order() {
        let mut c = raw(
            vec![Group::new(gid("default"), "D", 0)],
            vec![image("a", "default", 5), image("b", "default", 0)],
        );
        renumber(&mut c, &gid("default"));
        assert_eq!(c.images[0].order, 0);
        assert_eq!(c.images[1].order, 1);
    }

    #[test]
    fn renumber_only_touches_one_group() {
        let mut c = raw(
            vec![Group::new(gid("default"), "D", 0), Group::new(gid("g2"), "G", 1)],
            vec![image("a", "default", 4), image("b", "g2", 9)],
        );
        renumber(&mut c, &gid("default"));
        assert_eq!(c.images[0].order, 0);
        assert_eq!(c.images[1].order, 9);
    }

    #[test]
    fn renumber_all_fixes_every_group() {
        let mut c = raw(
            vec![Group::new(gid("default"), "D", 0), Group::new(gid("g2"), "G", 1)],
            vec![
                image("a", "default", 4),
                image("b", "g2", 9),
                image("c", "g2", 2),
            ],
        );
        renumber_all(&mut c);
        assert!(check_dense(&c).is_ok());
        assert_eq!(c.images[2].order, 1);
    }

    #[test]
    fn renumber_groups_sorts_then_densifies() {
        let mut c = raw(
            vec![
                Group::new(gid("b"), "B", 7),
                Group::new(gid("a"), "A", 2),
                Group::new(gid("c"), "C", 9),
            ],
            vec![],
        );
        renumber_groups(&mut c);
        let seq: Vec<(&str, u32)> = c.groups.iter().map(|g| (g.id.as_str(), g.order)).collect();
        assert_eq!(seq, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn renumber_groups_is_stable_for_ties() {
        let mut c = raw(
            vec![Group::new(gid("x"), "X", 1), Group::new(gid("y"), "Y", 1)],
            vec![],
        );
        renumber_groups(&mut c);
        assert_eq!(c.groups[0].id, gid("x"));
        assert_eq!(c.groups[1].order, 1);
    }

    #[test]
    fn check_dense_reports_gap() {
        let c = raw(
            vec![Group::new(gid("default"), "D", 0)],
            vec![image("a", "default", 0), image("b", "default", 2)],
        );
        assert!(matches!(
            check_dense(&c),
            Err(OrderError::ImagesNotDense { .. })
        ));
    }

    #[test]
    fn check_dense_reports_sequence_mismatch() {
        let c = raw(
            vec![Group::new(gid("default"), "D", 0)],
            vec![image("a", "default", 1), image("b", "default", 0)],
        );
        assert_eq!(
            check_dense(&c),
            Err(OrderError::ImagesOutOfSequence(gid("default")))
        );
    }

    #[test]
    fn check_dense_reports_dangling_group() {
        let c = raw(
            vec![Group::new(gid("default"), "D", 0)],
            vec![image("a", "gone", 0)],
        );
        assert!(matches!(
            check_dense(&c),
            Err(OrderError::DanglingGroup { .. })
        ));
    }

    #[test]
    fn check_dense_reports_group_gap() {
        let c = raw(
            vec![Group::new(gid("default"), "D", 0), Group::new(gid("g"), "G", 2)],
            vec![],
        );
        assert_eq!(check_dense(&c), Err(OrderError::GroupsNotDense(vec![0, 2])));
    }
}
