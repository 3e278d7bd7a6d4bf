//! cli::commands::media
//!
//! Bring images into the gallery: import files already in the folder, or
//! upload local files.
//!
//! # Example
//!
//! ```bash
//! gallerist import --all
//! gallerist import beach.jpg --group Holidays
//! gallerist upload ~/Pictures/*.jpg --group Holidays
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::setup;
use crate::engine::Context;
use crate::store::RemoteFile;
use crate::ui::output;

/// Import folder files into a group.
pub fn import(ctx: &Context, files: &[String], all: bool, group: &str) -> Result<()> {
    if files.is_empty() && !all {
        bail!("Name the files to import, or pass --all.\n\nRun 'gallerist scan' to see what is in the folder.");
    }
    let rt = setup::runtime()?;
    rt.block_on(import_async(ctx, files, all, group))
}

async fn import_async(ctx: &Context, files: &[String], all: bool, group: &str) -> Result<()> {
    let verbosity = setup::verbosity(ctx);
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;
    let group_id = setup::resolve_group(&collection, group)?;

    let listing = service.list_images().await.map_err(setup::remote_error)?;
    let selected = if all {
        listing
    } else {
        select_files(&listing, files)?
    };

    let added = service.import(&mut collection, &selected, &group_id)?;
    let skipped = selected.len() - added.len();
    if skipped > 0 {
        output::warn(
            format!("{} file(s) already in the gallery were skipped", skipped),
            verbosity,
        );
    }
    if added.is_empty() {
        output::print("Nothing to import.", verbosity);
        return Ok(());
    }

    setup::finish(
        ctx,
        &service,
        &collection,
        &format!("Imported {} image(s).", added.len()),
    )
    .await
}

/// Pick listed files by id or name, in the order requested.
fn select_files(listing: &[RemoteFile], wanted: &[String]) -> Result<Vec<RemoteFile>> {
    let mut selected: Vec<RemoteFile> = Vec::with_capacity(wanted.len());
    for reference in wanted {
        let file = listing
            .iter()
            .find(|f| &f.id == reference)
            .or_else(|| listing.iter().find(|f| &f.name == reference));
        match file {
            Some(file) if selected.iter().any(|s| s.id == file.id) => {}
            Some(file) => selected.push(file.clone()),
            None => bail!("No image '{}' in the folder.", reference),
        }
    }
    Ok(selected)
}

/// Upload local files into a group.
pub fn upload(ctx: &Context, paths: &[PathBuf], group: &str) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(upload_async(ctx, paths, group))
}

async fn upload_async(ctx: &Context, paths: &[PathBuf], group: &str) -> Result<()> {
    let verbosity = setup::verbosity(ctx);
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;
    let group_id = setup::resolve_group(&collection, group)?;

    let mut uploaded = 0usize;
    let mut failed = 0usize;
    for path in paths {
        match service.upload(&mut collection, path, &group_id).await {
            Ok(id) => {
                uploaded += 1;
                output::print(format!("Uploaded {} as {}", path.display(), id), verbosity);
            }
            Err(e) if e.needs_reauth() => return Err(setup::remote_error(e)),
            Err(e) => {
                failed += 1;
                output::error(format!("{}: {}", path.display(), e));
            }
        }
    }

    if uploaded == 0 {
        bail!("No files were uploaded.");
    }
    setup::finish(
        ctx,
        &service,
        &collection,
        &format!("Uploaded {} image(s).", uploaded),
    )
    .await?;
    if failed > 0 {
        bail!("{} file(s) failed to upload.", failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, name: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: name.to_string(),
            size: 10,
            mime_type: "image/jpeg".to_string(),
            created_time: None,
            display_link: None,
        }
    }

    #[test]
    fn select_by_id_or_name_in_request_order() {
        let listing = vec![file("f1", "a.jpg"), file("f2", "b.jpg")];
        let wanted = vec!["b.jpg".to_string(), "f1".to_string(), "f2".to_string()];
        let selected = select_files(&listing, &wanted).unwrap();
        let ids: Vec<&str> = selected.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f2", "f1"]);
    }

    #[test]
    fn select_unknown_file_fails() {
        let listing = vec![file("f1", "a.jpg")];
        let err = select_files(&listing, &["zzz".to_string()]).unwrap_err();
        assert!(err.to_string().contains("zzz"));
    }
}
