//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts and confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All terminal output and prompts go through this module so that `--quiet`
//! and non-interactive runs behave the same in every command. Library code
//! logs through `tracing` instead and never prints.

pub mod output;
pub mod prompts;
