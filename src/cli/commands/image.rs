//! cli::commands::image
//!
//! Image management: move, delete, describe, and download.
//!
//! # Example
//!
//! ```bash
//! gallerist image move img_17000_ab12cd34 --group Holidays
//! gallerist image move beach.jpg --before dunes.jpg
//! gallerist image describe beach.jpg "Sunset at the north end"
//! gallerist image download beach.jpg -o ~/Downloads
//! gallerist image delete beach.jpg --yes
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Result};

use super::setup;
use crate::cli::args::ImageAction;
use crate::core::collection::Collection;
use crate::core::reorder::{self, MoveOutcome};
use crate::core::types::{GroupId, ImageId, Position};
use crate::engine::{Context, GalleryService};
use crate::ui::{output, prompts};

/// Run an image subcommand.
pub fn image(ctx: &Context, action: ImageAction) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(image_async(ctx, action))
}

async fn image_async(ctx: &Context, action: ImageAction) -> Result<()> {
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;

    match action {
        ImageAction::Move {
            image,
            group,
            before,
            after,
        } => {
            let id = setup::resolve_image(&collection, &image)?;
            let plan = plan_move(&collection, &id, group.as_deref(), before, after)?;
            let outcome = reorder::move_image(
                &mut collection,
                &id,
                plan.target.as_ref(),
                &plan.group,
                plan.position,
            )?;
            if outcome == MoveOutcome::Unchanged {
                output::print("Image is already there; nothing to do.", setup::verbosity(ctx));
                return Ok(());
            }
            setup::finish(ctx, &service, &collection, "Moved image.").await
        }

        ImageAction::Delete { image, yes } => {
            let id = setup::resolve_image(&collection, &image)?;
            if !yes {
                if !ctx.interactive {
                    bail!("Refusing to delete '{}' without confirmation; pass --yes.", image);
                }
                let message = format!("Delete '{}' and its file in Drive?", image);
                if !prompts::confirm(&message, false, ctx.interactive)? {
                    output::print("Cancelled.", setup::verbosity(ctx));
                    return Ok(());
                }
            }
            let removed = service
                .delete_image(&mut collection, &id)
                .await
                .map_err(setup::remote_error)?;
            setup::finish(
                ctx,
                &service,
                &collection,
                &format!("Deleted '{}'.", removed.name),
            )
            .await
        }

        ImageAction::Describe { image, text } => {
            let id = setup::resolve_image(&collection, &image)?;
            collection.set_description(&id, &text)?;
            let summary = if text.is_empty() {
                "Cleared description."
            } else {
                "Updated description."
            };
            setup::finish(ctx, &service, &collection, summary).await
        }

        ImageAction::Download { image, output: dest } => {
            download(ctx, &service, &collection, &image, &dest).await
        }
    }
}

async fn download(
    ctx: &Context,
    service: &GalleryService,
    collection: &Collection,
    image: &str,
    dest: &Path,
) -> Result<()> {
    let id = setup::resolve_image(collection, image)?;
    let written = service
        .download(collection, &id, dest)
        .await
        .map_err(setup::remote_error)?;
    output::success(
        format!("Saved to {}", written.display()),
        setup::verbosity(ctx),
    );
    Ok(())
}

/// Resolved arguments for `move_image`.
#[derive(Debug, PartialEq)]
struct MovePlan {
    target: Option<ImageId>,
    group: GroupId,
    position: Position,
}

/// Work out where an image goes.
///
/// With a neighbour image the destination group is that image's group; a
/// conflicting `--group` is rejected. With only `--group` the image goes to
/// the end of that group.
fn plan_move(
    collection: &Collection,
    id: &ImageId,
    group: Option<&str>,
    before: Option<String>,
    after: Option<String>,
) -> Result<MovePlan> {
    let (neighbour, position) = match (before, after) {
        (Some(reference), None) => (Some(reference), Position::Before),
        (None, Some(reference)) => (Some(reference), Position::After),
        (None, None) => (None, Position::After),
        (Some(_), Some(_)) => bail!("Give only one of --before and --after."),
    };
    let group = group
        .map(|reference| setup::resolve_group(collection, reference))
        .transpose()?;

    match neighbour {
        Some(reference) => {
            let target_id = setup::resolve_image(collection, &reference)?;
            if &target_id == id {
                bail!("An image cannot be placed next to itself.");
            }
            let target_group = collection
                .image(&target_id)
                .map(|img| img.group_id.clone())
                .ok_or_else(|| anyhow!("No image with id '{}'.", target_id))?;
            if let Some(group) = group {
                if group != target_group {
                    bail!(
                        "'{}' is not in group '{}'; drop --group or pick a neighbour in that group.",
                        reference,
                        group
                    );
                }
            }
            Ok(MovePlan {
                target: Some(target_id),
                group: target_group,
                position,
            })
        }
        None => {
            let group = group.ok_or_else(|| {
                anyhow!("Say where to move the image: --group, --before, or --after.")
            })?;
            Ok(MovePlan {
                target: None,
                group,
                position,
            })
        }
    }
}
