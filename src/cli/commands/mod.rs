//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Loads the gallery through the engine
//! 3. Applies the change and saves, or formats and displays output
//!
//! Handlers do NOT talk to Drive directly; every remote call goes through
//! [`crate::engine::GalleryService`].
//!
//! # Async Commands
//!
//! Everything that touches Drive or the OAuth endpoints is async. Each
//! handler builds a Tokio runtime and blocks on its `_async` body, so
//! dispatch itself stays synchronous.

mod auth;
mod completion;
mod config_cmd;
mod group;
mod image;
mod media;
mod settings;
mod setup;
mod show;
mod view;

pub use auth::auth;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use group::group;
pub use image::image;
pub use media::{import, upload};
pub use settings::{password, title};
pub use show::{scan, show};
pub use view::view;

use crate::cli::args::{Command, ConfigAction};
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Auth { action } => auth::auth(ctx, action),

        // Browsing
        Command::Show { group } => show::show(ctx, group.as_deref()),
        Command::Scan => show::scan(ctx),
        Command::View {
            search,
            open,
            remember,
            forget,
        } => view::view(ctx, search.as_deref(), open.as_deref(), remember, forget),

        // Content
        Command::Import { files, all, group } => media::import(ctx, &files, all, &group),
        Command::Upload { paths, group } => media::upload(ctx, &paths, &group),
        Command::Group { action } => group::group(ctx, action),
        Command::Image { action } => image::image(ctx, action),

        // Settings
        Command::Title { title } => settings::title(ctx, title.as_deref()),
        Command::Password { action } => settings::password(ctx, action),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
