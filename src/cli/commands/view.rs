//! cli::commands::view
//!
//! The visitor's view of a gallery, behind its password gate.
//!
//! # Design
//!
//! - Protected galleries are shown only after the password is entered, or
//!   while a remembered unlock is still valid for the current password
//! - Folder images the manifest does not mention are shown in the default
//!   group; a folder without a manifest shows all of its images
//! - A wrong password can be retried a few times before giving up
//! - `--open` shows one image the way the lightbox does: caption, links,
//!   and its neighbours
//!
//! # Example
//!
//! ```bash
//! gallerist view
//! gallerist view --search trip
//! gallerist view --open beach.jpg --remember
//! gallerist view --forget
//! ```

use anyhow::{bail, Result};

use super::setup;
use crate::core::access::AccessError;
use crate::core::collection::Collection;
use crate::engine::Context;
use crate::ui::output::{self, format_file_size};
use crate::ui::prompts;
use crate::viewer::{
    thumbnail_url, GalleryView, GateError, GateStatus, GroupSection, Lightbox, PasswordGate,
};
use crate::viewer::lightbox::{display_name, full_view_url};

const MAX_ATTEMPTS: usize = 3;

/// Browse the gallery.
pub fn view(
    ctx: &Context,
    search: Option<&str>,
    open: Option<&str>,
    remember: bool,
    forget: bool,
) -> Result<()> {
    let config = setup::load_config()?;
    let secrets = setup::secret_store(&config)?;
    let gate = PasswordGate::new(secrets.as_ref()).with_session_hours(config.session_hours());

    if forget {
        gate.forget()?;
        output::success("Forgot the remembered unlock.", setup::verbosity(ctx));
        return Ok(());
    }

    let rt = setup::runtime()?;
    let service = setup::open_service(ctx, &config)?;
    let collection = rt
        .block_on(service.load_for_viewing())
        .map_err(setup::remote_error)?;

    pass_gate(ctx, &gate, &collection, remember)?;

    let view = GalleryView::new(&collection);
    match open {
        Some(reference) => {
            let id = setup::resolve_image(&collection, reference)?;
            let mut lightbox = view.lightbox();
            if lightbox.open_image(&id).is_none() {
                bail!("'{}' is not shown in the gallery.", reference);
            }
            println!("{}", render_lightbox(&lightbox));
        }
        None => print!("{}", render_gallery(&view, search.unwrap_or(""))),
    }
    Ok(())
}

fn pass_gate(
    ctx: &Context,
    gate: &PasswordGate<'_>,
    collection: &Collection,
    remember: bool,
) -> Result<()> {
    let verbosity = setup::verbosity(ctx);
    match gate.status(collection)? {
        GateStatus::Open => return Ok(()),
        GateStatus::Remembered { hours_left } => {
            output::debug(
                format!("Unlocked from a remembered session ({}h left)", hours_left),
                verbosity,
            );
            return Ok(());
        }
        GateStatus::Locked => {}
    }

    if !ctx.interactive {
        bail!("This gallery is password protected; run 'gallerist view' in a terminal to unlock it.");
    }
    let mut attempt = 1;
    loop {
        let entered = prompts::password("Gallery password", ctx.interactive)?;
        let err = match gate.unlock(collection, &entered, remember) {
            Ok(GateStatus::Remembered { hours_left }) => {
                output::print(format!("Unlocked for {} hours.", hours_left), verbosity);
                return Ok(());
            }
            Ok(_) => return Ok(()),
            Err(err) => err,
        };
        match retry_hint(&err) {
            Some(hint) if attempt < MAX_ATTEMPTS => output::warn(hint, verbosity),
            _ => return Err(err.into()),
        }
        attempt += 1;
    }
}

/// What to say before asking again, or `None` when asking again cannot help.
fn retry_hint(err: &GateError) -> Option<&'static str> {
    match err {
        GateError::Access(AccessError::Empty) => Some("Please enter the password."),
        GateError::Access(AccessError::Mismatch) => Some("Incorrect password. Please try again."),
        _ => None,
    }
}

/// Gallery listing: title, counter, and each matching section.
fn render_gallery(view: &GalleryView<'_>, search: &str) -> String {
    let mut out = format!("{}\n{}\n", view.title(), view.counter_label());
    if view.is_empty() {
        out.push_str("\nNo images in this gallery yet.\n");
        return out;
    }

    let sections = view.search(search);
    if sections.is_empty() {
        out.push_str(&format!("\nNo groups match '{}'.\n", search.trim()));
        return out;
    }
    for section in sections {
        out.push('\n');
        out.push_str(&render_section(section));
    }
    out
}

fn render_section(section: &GroupSection<'_>) -> String {
    let mut out = format!("{} ({})\n", section.group.name, section.images.len());
    for image in &section.images {
        out.push_str(&format!(
            "  {}  {}  {}\n",
            display_name(image),
            format_file_size(image.size),
            thumbnail_url(image)
        ));
    }
    out
}

/// Lightbox view of the open image.
fn render_lightbox(lightbox: &Lightbox<'_>) -> String {
    let (Some(image), Some(caption)) = (lightbox.current(), lightbox.caption()) else {
        return String::new();
    };
    let mut out = format!("{}\n\n", caption);
    out.push_str(&format!("Full size:  {}\n", full_view_url(image)));
    out.push_str(&format!("Thumbnail:  {}\n", thumbnail_url(image)));

    if let Some(prev) = lightbox.clone().prev() {
        out.push_str(&format!("\nPrevious:   {}", display_name(prev)));
    }
    if let Some(next) = lightbox.clone().next() {
        out.push_str(&format!("\nNext:       {}", display_name(next)));
    }
    out
}
