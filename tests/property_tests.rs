//! Property-based tests for the ordered collection.
//!
//! These tests use proptest to drive random sequences of inserts, deletes,
//! and moves, and check that the order invariants hold after every step.

use proptest::prelude::*;

use gallerist::core::collection::Collection;
use gallerist::core::model::Image;
use gallerist::core::order::{check_dense, is_dense};
use gallerist::core::reorder::{move_group, move_image};
use gallerist::core::types::{GroupId, GroupTarget, ImageId, Position};
use gallerist::manifest::{deserialize, serialize};

/// One mutation, with indices resolved against the collection when applied.
#[derive(Debug, Clone)]
enum Op {
    AddGroup(u8),
    DeleteGroup(usize),
    RenameGroup(usize, u8),
    AddImage(usize),
    RemoveImage(usize),
    MoveImage {
        image: usize,
        target: Option<usize>,
        group: usize,
        after: bool,
    },
    MoveGroupToGroup {
        group: usize,
        target: usize,
        after: bool,
    },
    MoveGroupToOrder {
        group: usize,
        order: u32,
        after: bool,
    },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::AddGroup),
        any::<usize>().prop_map(Op::DeleteGroup),
        (any::<usize>(), 0u8..6).prop_map(|(g, n)| Op::RenameGroup(g, n)),
        any::<usize>().prop_map(Op::AddImage),
        any::<usize>().prop_map(Op::RemoveImage),
        (
            any::<usize>(),
            proptest::option::of(any::<usize>()),
            any::<usize>(),
            any::<bool>()
        )
            .prop_map(|(image, target, group, after)| Op::MoveImage {
                image,
                target,
                group,
                after,
            }),
        (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(group, target, after)| {
            Op::MoveGroupToGroup {
                group,
                target,
                after,
            }
        }),
        (any::<usize>(), 0u32..8, any::<bool>()).prop_map(|(group, order, after)| {
            Op::MoveGroupToOrder {
                group,
                order,
                after,
            }
        }),
    ]
}

fn position(after: bool) -> Position {
    if after {
        Position::After
    } else {
        Position::Before
    }
}

fn group_at(c: &Collection, index: usize) -> GroupId {
    let groups = c.groups();
    groups[index % groups.len()].id.clone()
}

fn image_at(c: &Collection, index: usize) -> Option<ImageId> {
    let images = c.images();
    (!images.is_empty()).then(|| images[index % images.len()].id.clone())
}

/// Apply an op. Returns whether it succeeded.
fn apply(c: &mut Collection, step: usize, op: &Op) -> bool {
    match op {
        Op::AddGroup(n) => c.add_group(&format!("Group {}", n)).is_ok(),
        Op::DeleteGroup(i) => {
            let id = group_at(c, *i);
            c.delete_group(&id).is_ok()
        }
        Op::RenameGroup(i, n) => {
            let id = group_at(c, *i);
            c.rename_group(&id, &format!("Group {}", n)).is_ok()
        }
        Op::AddImage(g) => {
            let group = group_at(c, *g);
            let id = ImageId::new(format!("img_{}", step)).unwrap();
            c.insert_image(Image::new(id, "x.jpg", group, format!("ref-{}", step), 1))
                .is_ok()
        }
        Op::RemoveImage(i) => match image_at(c, *i) {
            Some(id) => c.remove_image(&id).is_ok(),
            None => false,
        },
        Op::MoveImage {
            image,
            target,
            group,
            after,
        } => {
            let Some(id) = image_at(c, *image) else {
                return false;
            };
            let target = target.and_then(|t| image_at(c, t));
            let group = group_at(c, *group);
            move_image(c, &id, target.as_ref(), &group, position(*after)).is_ok()
        }
        Op::MoveGroupToGroup {
            group,
            target,
            after,
        } => {
            let id = group_at(c, *group);
            let target = GroupTarget::Group(group_at(c, *target));
            move_group(c, &id, &target, position(*after)).is_ok()
        }
        Op::MoveGroupToOrder {
            group,
            order,
            after,
        } => {
            let id = group_at(c, *group);
            move_group(c, &id, &GroupTarget::Order(*order), position(*after)).is_ok()
        }
    }
}

fn image_orders(c: &Collection, group: &GroupId) -> Vec<u32> {
    c.images()
        .iter()
        .filter(|img| &img.group_id == group)
        .map(|img| img.order)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Orders stay dense and in list sequence after every step.
    #[test]
    fn orders_stay_dense(ops in prop::collection::vec(op(), 1..40)) {
        let mut c = Collection::new();
        for (step, op) in ops.iter().enumerate() {
            apply(&mut c, step, op);
            prop_assert!(check_dense(&c).is_ok(), "after {:?}: {:?}", op, check_dense(&c));

            for group in c.groups() {
                let orders = image_orders(&c, &group.id);
                let expected: Vec<u32> = (0..orders.len() as u32).collect();
                prop_assert_eq!(orders, expected);
            }
            prop_assert!(is_dense(c.groups().iter().map(|g| g.order)));
        }
    }

    /// A rejected operation leaves the collection exactly as it was.
    #[test]
    fn failed_ops_change_nothing(ops in prop::collection::vec(op(), 1..40)) {
        let mut c = Collection::new();
        for (step, op) in ops.iter().enumerate() {
            let before = c.clone();
            if !apply(&mut c, step, op) {
                prop_assert_eq!(&c, &before, "{:?} failed but changed the collection", op);
            }
        }
    }

    /// The default group survives everything, and every image has a group.
    #[test]
    fn default_group_survives(ops in prop::collection::vec(op(), 1..40)) {
        let mut c = Collection::new();
        for (step, op) in ops.iter().enumerate() {
            apply(&mut c, step, op);
        }
        prop_assert!(c.group(&GroupId::default_group()).is_some());
        for image in c.images() {
            prop_assert!(c.group(&image.group_id).is_some());
        }
    }

    /// Serializing and deserializing with no listing gives the same collection.
    #[test]
    fn manifest_round_trip(ops in prop::collection::vec(op(), 0..30), protected in any::<bool>()) {
        let mut c = Collection::new();
        for (step, op) in ops.iter().enumerate() {
            apply(&mut c, step, op);
        }
        if protected {
            c.set_password_hash("5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8");
        }
        let back = deserialize(serialize(&c), &[]).unwrap();
        prop_assert_eq!(back, c);
    }

    /// Deleting a group hands all of its images to the default group.
    #[test]
    fn deleted_group_images_go_to_default(
        ops in prop::collection::vec(op(), 1..30),
        victim in any::<usize>(),
    ) {
        let mut c = Collection::new();
        for (step, op) in ops.iter().enumerate() {
            apply(&mut c, step, op);
        }
        let id = group_at(&c, victim);
        prop_assume!(!id.is_default());

        let moved: Vec<ImageId> = c.images_in_group(&id).iter().map(|img| img.id.clone()).collect();
        let total = c.images().len();
        c.delete_group(&id).unwrap();

        prop_assert!(c.group(&id).is_none());
        prop_assert_eq!(c.images().len(), total);
        for image_id in moved {
            prop_assert!(c.image(&image_id).unwrap().group_id.is_default());
        }
        prop_assert!(check_dense(&c).is_ok());
    }
}
