//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output; implies `--no-interactive`
//! - `--folder <url|id>`: Work in this Drive folder instead of the configured one
//! - `--client-id <id>`: OAuth client id override
//! - `--no-save`: Print the resulting manifest instead of saving it

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::Position;

/// Gallerist - manage grouped photo galleries stored in Google Drive
#[derive(Parser, Debug)]
#[command(name = "gallerist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Drive folder URL or id (overrides the configured folder)
    #[arg(long, global = true, value_name = "URL|ID")]
    pub folder: Option<String>,

    /// OAuth client id (overrides the configured one)
    #[arg(long, global = true, value_name = "ID")]
    pub client_id: Option<String>,

    /// Print the resulting manifest instead of saving it
    #[arg(long, global = true)]
    pub no_save: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Interactive unless `--no-interactive` or `--quiet` was given or stdin
    /// is not a terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet) && std::io::stdin().is_terminal()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in to Google Drive, sign out, or show the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show the gallery's groups and images
    #[command(
        name = "show",
        long_about = "Show the gallery's groups and images in display order.\n\n\
            Loads the manifest from the configured folder and prints every content \
            group with its images. Image ids shown here are what the image commands \
            accept.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Whole gallery
    gallerist show

    # One group, by name or id
    gallerist show --group Holidays

    # Another folder
    gallerist show --folder https://drive.google.com/drive/folders/1AbC"
    )]
    Show {
        /// Only show this group (name or id)
        #[arg(long)]
        group: Option<String>,
    },

    /// List the folder's images and whether the gallery uses them
    Scan,

    /// Add images already in the folder to the gallery
    #[command(
        name = "import",
        after_help = "\
WORKFLOW EXAMPLES:
    # See what is there
    gallerist scan

    # Import everything not yet in the gallery
    gallerist import --all

    # Import two files into a group
    gallerist import beach.jpg dunes.jpg --group Holidays"
    )]
    Import {
        /// File names or ids from `gallerist scan`
        files: Vec<String>,

        /// Import every file not yet in the gallery
        #[arg(long, conflicts_with = "files")]
        all: bool,

        /// Target group (name or id)
        #[arg(long, default_value = "default")]
        group: String,
    },

    /// Upload local image files into a group
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Target group (name or id)
        #[arg(long, default_value = "default")]
        group: String,
    },

    /// Add, delete, rename, or reorder groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Move, delete, describe, or download images
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// Show or set the gallery title
    Title {
        /// New title
        title: Option<String>,
    },

    /// Enable, change, or remove password protection
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Browse the gallery as a visitor would
    #[command(
        name = "view",
        long_about = "Browse the gallery as a visitor would.\n\n\
            Protected galleries ask for the password first. With --remember the \
            unlock is kept for the configured number of hours, until the password \
            is changed.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Browse
    gallerist view

    # Only groups whose name contains 'trip'
    gallerist view --search trip

    # Show one image with its caption and navigation
    gallerist view --open img_1700000000000_ab12cd34"
    )]
    View {
        /// Only show groups whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Show a single image with its caption
        #[arg(long, value_name = "IMAGE")]
        open: Option<String>,

        /// Remember the unlock for this gallery
        #[arg(long)]
        remember: bool,

        /// Forget a remembered unlock and exit
        #[arg(long, conflicts_with_all = ["search", "open", "remember"])]
        forget: bool,
    },

    /// Get, set, or list configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Auth subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthAction {
    /// Sign in with the device flow
    Login {
        /// Do not try to open the verification page in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Revoke and forget the stored session
    Logout,
    /// Show whether a session is stored and when it expires
    Status,
}

/// Group subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum GroupAction {
    /// Add a group at the end
    Add {
        /// Group name
        name: String,
    },
    /// Delete a group; its images move to the default group
    Delete {
        /// Group name or id
        group: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a group
    Rename {
        /// Group name or id
        group: String,
        /// New name
        name: String,
    },
    /// Move a group relative to another group or to a position
    #[command(after_help = "\
WORKFLOW EXAMPLES:
    # Put Holidays first
    gallerist group move Holidays --before 'Default Group'

    # Put Pets right after Holidays
    gallerist group move Pets --after Holidays

    # Drop onto the gap before order 2
    gallerist group move Pets --to-order 2 --position before")]
    Move {
        /// Group name or id
        group: String,

        /// Place before this group
        #[arg(long, conflicts_with_all = ["after", "to_order"])]
        before: Option<String>,

        /// Place after this group
        #[arg(long, conflicts_with = "to_order")]
        after: Option<String>,

        /// Place relative to this order value
        #[arg(long)]
        to_order: Option<u32>,

        /// With --to-order: before or after that order
        #[arg(long, default_value = "before", requires = "to_order")]
        position: Position,
    },
}

/// Image subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ImageAction {
    /// Move an image next to another image or into a group
    Move {
        /// Image id or name
        image: String,

        /// Destination group (name or id)
        #[arg(long)]
        group: Option<String>,

        /// Place before this image
        #[arg(long, conflicts_with = "after")]
        before: Option<String>,

        /// Place after this image
        #[arg(long)]
        after: Option<String>,
    },
    /// Delete an image and its file in Drive
    Delete {
        /// Image id or name
        image: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Set an image's description
    Describe {
        /// Image id or name
        image: String,
        /// New description (empty clears it)
        text: String,
    },
    /// Download an image's file
    Download {
        /// Image id or name
        image: String,

        /// Destination file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// Password subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PasswordAction {
    /// Enable protection or change the password
    Set,
    /// Remove protection
    Clear,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gallerist").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = parse(&["show", "--folder", "F1", "-q", "--no-save"]);
        assert_eq!(cli.folder.as_deref(), Some("F1"));
        assert!(cli.quiet);
        assert!(cli.no_save);
        assert!(!cli.interactive());
    }

    #[test]
    fn import_defaults_to_default_group() {
        let cli = parse(&["import", "--all"]);
        match cli.command {
            Command::Import { all, group, files } => {
                assert!(all);
                assert!(files.is_empty());
                assert_eq!(group, "default");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn group_move_to_order() {
        let cli = parse(&["group", "move", "Pets", "--to-order", "2", "--position", "after"]);
        match cli.command {
            Command::Group {
                action:
                    GroupAction::Move {
                        to_order, position, ..
                    },
            } => {
                assert_eq!(to_order, Some(2));
                assert_eq!(position, Position::After);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn conflicting_targets_rejected() {
        let result = Cli::try_parse_from([
            "gallerist", "group", "move", "Pets", "--before", "A", "--after", "B",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn upload_requires_paths() {
        assert!(Cli::try_parse_from(["gallerist", "upload"]).is_err());
    }
}
