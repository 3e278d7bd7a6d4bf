//! cli
//!
//! Command-line interface layer for Gallerist.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that drive the [`crate::engine`]. Collection changes are made
//! through [`crate::core`] and saved by the engine.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use crate::logging::{self, LogConfig};
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    logging::init(&LogConfig::from_flags(cli.quiet, cli.debug));

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        folder: cli.folder.clone(),
        client_id: cli.client_id.clone(),
        no_save: cli.no_save,
    };

    commands::dispatch(cli.command, &ctx)
}
