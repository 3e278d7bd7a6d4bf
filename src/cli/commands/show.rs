//! cli::commands::show
//!
//! Read-only listing of the gallery and of the folder behind it.
//!
//! # Example
//!
//! ```bash
//! gallerist show
//! gallerist show --group Holidays
//! gallerist scan
//! ```

use anyhow::Result;

use super::setup;
use crate::core::collection::Collection;
use crate::core::model::{Group, Image};
use crate::engine::Context;
use crate::ui::output::{format_file_size, format_list};

/// Print the gallery's groups and images in display order.
pub fn show(ctx: &Context, group: Option<&str>) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(show_async(ctx, group))
}

async fn show_async(ctx: &Context, group: Option<&str>) -> Result<()> {
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let collection = setup::load(&service).await?;

    let only = group
        .map(|reference| setup::resolve_group(&collection, reference))
        .transpose()?;

    if !ctx.quiet {
        println!("{}", collection.title());
        println!("Folder: {}", service.folder());
        if collection.is_protected() {
            println!("Password protected");
        }
        println!();
    }

    for group in collection.groups() {
        if only.as_ref().is_some_and(|id| id != &group.id) {
            continue;
        }
        print_group(&collection, group, ctx.quiet);
    }
    Ok(())
}

fn print_group(collection: &Collection, group: &Group, quiet: bool) {
    let images = collection.images_in_group(&group.id);
    if quiet {
        for image in images {
            println!("{}\t{}\t{}", group.id, image.id, image.name);
        }
        return;
    }

    println!("{} [{}] ({} images)", group.name, group.id, images.len());
    let lines: Vec<String> = images.iter().map(|img| image_line(img)).collect();
    if !lines.is_empty() {
        println!("{}", format_list(&lines, "  "));
    }
    println!();
}

fn image_line(image: &Image) -> String {
    let mut line = format!(
        "{:>3}. {}  {}  ({})",
        image.order,
        image.id,
        image.name,
        format_file_size(image.size)
    );
    if !image.description.is_empty() {
        line.push_str(&format!("\n       {}", image.description));
    }
    line
}

/// List the folder's images and whether the gallery uses them.
pub fn scan(ctx: &Context) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(scan_async(ctx))
}

async fn scan_async(ctx: &Context) -> Result<()> {
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let collection = setup::load(&service).await?;
    let entries = service.scan(&collection).await.map_err(setup::remote_error)?;

    if entries.is_empty() {
        if !ctx.quiet {
            println!("No images found in {}.", service.folder());
        }
        return Ok(());
    }

    let pending = entries.iter().filter(|e| !e.imported).count();
    for entry in &entries {
        let mark = if entry.imported { "*" } else { " " };
        if ctx.quiet {
            println!("{}\t{}\t{}", mark, entry.file.id, entry.file.name);
        } else {
            println!(
                "{} {}  {}  ({})",
                mark,
                entry.file.id,
                entry.file.name,
                format_file_size(entry.file.size)
            );
        }
    }
    if !ctx.quiet {
        println!();
        println!(
            "{} images, {} not yet in the gallery (* = imported).",
            entries.len(),
            pending
        );
        if pending > 0 {
            println!("Run 'gallerist import --all' to add them.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GroupId, ImageId};

    #[test]
    fn image_line_shows_size_and_caption() {
        let mut image = Image::new(
            ImageId::new("img_1").unwrap(),
            "beach.jpg",
            GroupId::default_group(),
            "blob",
            1536,
        )
        .with_description("Sunset");
        image.order = 2;

        let line = image_line(&image);
        assert!(line.starts_with("  2. img_1  beach.jpg  (1.5 KB)"));
        assert!(line.ends_with("\n       Sunset"));
    }

    #[test]
    fn image_line_without_caption_is_single_line() {
        let image = Image::new(
            ImageId::new("img_2").unwrap(),
            "dunes.jpg",
            GroupId::default_group(),
            "blob",
            0,
        );
        let line = image_line(&image);
        assert!(!line.contains('\n'));
        assert!(line.contains("0 Bytes"));
    }
}
