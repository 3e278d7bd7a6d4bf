//! Gallerist - manage grouped photo galleries stored in Google Drive
//!
//! A gallery is a folder of images plus one JSON manifest describing how
//! they are grouped and ordered, the gallery title, and an optional
//! password. Gallerist reads and writes that manifest, uploads and removes
//! images, and renders the gallery the way a visitor sees it.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Load, mutate, and save a gallery against a blob store
//! - [`core`] - Domain types, the ordered collection, reordering, config
//! - [`manifest`] - The persisted JSON format
//! - [`store`] - Blob storage abstraction (Google Drive, in-memory mock)
//! - [`auth`] - OAuth device flow and session handling
//! - [`secrets`] - Secret storage abstraction
//! - [`viewer`] - Visitor view: sections, search, lightbox, password gate
//! - [`ui`] - User interaction utilities
//! - [`logging`] - Diagnostic logging setup
//!
//! # Correctness Invariants
//!
//! 1. Order values within each group, and across groups, are dense (0..n)
//! 2. Every image belongs to an existing group
//! 3. The default group always exists and cannot be deleted
//! 4. A failed operation leaves the collection unchanged

pub mod auth;
pub mod cli;
pub mod core;
pub mod engine;
pub mod logging;
pub mod manifest;
pub mod secrets;
pub mod store;
pub mod ui;
pub mod viewer;
