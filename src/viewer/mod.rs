//! viewer
//!
//! Read-only presentation of a gallery.
//!
//! # Modules
//!
//! - [`gallery`] - Sections shown to a visitor and the group search
//! - [`folder`] - Folder images the manifest does not mention
//! - [`lightbox`] - One-image-at-a-time navigation across all sections
//! - [`thumbnail`] - Which URL to render for an image
//! - [`gate`] - Password gate and the remembered unlock
//!
//! # Design
//!
//! Everything here borrows from a [`Collection`](crate::core::collection::Collection)
//! and never mutates it. The visitor sees the collection the admin commands
//! edit, plus the folder's unreferenced images merged in by [`folder`].

pub mod folder;
pub mod gallery;
pub mod gate;
pub mod lightbox;
pub mod thumbnail;

pub use folder::{folder_only, merge_listing, FOLDER_GROUP_NAME};
pub use gallery::{GalleryView, GroupSection};
pub use gate::{GateError, GateStatus, PasswordGate, UnlockSession, UNLOCK_SECRET_KEY};
pub use lightbox::Lightbox;
pub use thumbnail::{thumbnail_candidates, thumbnail_url, PLACEHOLDER_IMAGE};
