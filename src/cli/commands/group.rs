//! cli::commands::group
//!
//! Group management: add, delete, rename, and reorder.
//!
//! # Example
//!
//! ```bash
//! gallerist group add Holidays
//! gallerist group move Holidays --before 'Default Group'
//! gallerist group move Pets --to-order 2 --position after
//! gallerist group delete Pets --yes
//! ```

use anyhow::{bail, Result};

use super::setup;
use crate::cli::args::GroupAction;
use crate::core::reorder::{self, MoveOutcome};
use crate::core::types::{GroupTarget, Position};
use crate::engine::Context;
use crate::ui::{output, prompts};

/// Run a group subcommand.
pub fn group(ctx: &Context, action: GroupAction) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(group_async(ctx, action))
}

async fn group_async(ctx: &Context, action: GroupAction) -> Result<()> {
    let verbosity = setup::verbosity(ctx);
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;

    let summary = match action {
        GroupAction::Add { name } => {
            let id = collection.add_group(&name)?;
            format!("Added group '{}' ({}).", name.trim(), id)
        }

        GroupAction::Delete { group, yes } => {
            let id = setup::resolve_group(&collection, &group)?;
            let count = collection.images_in_group(&id).len();
            if !yes {
                if !ctx.interactive {
                    bail!("Refusing to delete group '{}' without confirmation; pass --yes.", group);
                }
                let message = format!(
                    "Delete group '{}'? Its {} image(s) move to the default group.",
                    group, count
                );
                if !prompts::confirm(&message, false, ctx.interactive)? {
                    output::print("Cancelled.", verbosity);
                    return Ok(());
                }
            }
            let removed = collection.delete_group(&id)?;
            format!(
                "Deleted group '{}'; {} image(s) moved to the default group.",
                removed.name, count
            )
        }

        GroupAction::Rename { group, name } => {
            let id = setup::resolve_group(&collection, &group)?;
            collection.rename_group(&id, &name)?;
            format!("Renamed group to '{}'.", name.trim())
        }

        GroupAction::Move {
            group,
            before,
            after,
            to_order,
            position,
        } => {
            let id = setup::resolve_group(&collection, &group)?;
            let (target, position) = match (before, after, to_order) {
                (Some(other), None, None) => (
                    GroupTarget::Group(setup::resolve_group(&collection, &other)?),
                    Position::Before,
                ),
                (None, Some(other), None) => (
                    GroupTarget::Group(setup::resolve_group(&collection, &other)?),
                    Position::After,
                ),
                (None, None, Some(order)) => (GroupTarget::Order(order), position),
                _ => bail!("Give exactly one of --before, --after, or --to-order."),
            };
            match reorder::move_group(&mut collection, &id, &target, position)? {
                MoveOutcome::Unchanged => {
                    output::print("Group is already there; nothing to do.", verbosity);
                    return Ok(());
                }
                MoveOutcome::Moved => format!("Moved group {} {}.", position, target),
            }
        }
    };

    setup::finish(ctx, &service, &collection, &summary).await
}
