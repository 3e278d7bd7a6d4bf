//! engine
//!
//! Orchestrates gallery operations against a blob store.
//!
//! # Architecture
//!
//! Commands follow one lifecycle:
//!
//! ```text
//! Load (manifest + listing) -> Mutate (Collection methods) -> Save (manifest)
//! ```
//!
//! The [`GalleryService`] owns the remote side of that cycle; everything in
//! between is a plain `&mut Collection` call. Operations that touch a blob
//! (upload, delete, download) go through the service so a remote failure
//! leaves the collection unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gallerist::engine::GalleryService;
//! use gallerist::store::{mock::MockStore, FolderRef};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let service = GalleryService::new(Arc::new(MockStore::new()), FolderRef::Root);
//!
//! let mut gallery = service.load().await.unwrap();
//! gallery.add_group("Holidays").unwrap();
//! service.save(&gallery).await.unwrap();
//! # });
//! ```

mod media;
mod service;

pub use media::{ScanEntry, ORIGINAL_NAME_KEY, PATH_KEY};
pub use service::{GalleryService, SaveOutcome};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::collection::CollectionError;
use crate::manifest::ManifestError;
use crate::store::StoreError;

/// Execution context for commands.
///
/// Global settings derived from CLI flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled (prompts allowed).
    pub interactive: bool,
    /// Folder override (URL or id).
    pub folder: Option<String>,
    /// OAuth client id override.
    pub client_id: Option<String>,
    /// Print the manifest instead of saving it.
    pub no_save: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            interactive: true,
            folder: None,
            client_id: None,
            no_save: false,
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collection rule was violated.
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// The manifest could not be encoded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A remote operation failed.
    #[error("remote operation failed: {0}")]
    Store(#[from] StoreError),

    /// A local file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if signing in again would fix this error.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            EngineError::Store(StoreError::AuthRequired | StoreError::AuthFailed(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GroupId;

    #[test]
    fn context_defaults_are_interactive() {
        let ctx = Context::default();
        assert!(ctx.interactive);
        assert!(!ctx.quiet);
        assert!(ctx.folder.is_none());
        assert!(!ctx.no_save);
    }

    #[test]
    fn reauth_classification() {
        assert!(EngineError::Store(StoreError::AuthRequired).needs_reauth());
        assert!(EngineError::Store(StoreError::AuthFailed("401".into())).needs_reauth());
        assert!(!EngineError::Store(StoreError::RateLimited).needs_reauth());
        assert!(
            !EngineError::Collection(CollectionError::GroupNotFound(GroupId::default_group()))
                .needs_reauth()
        );
    }

    #[test]
    fn io_error_names_path() {
        let err = EngineError::io(
            "/tmp/missing.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "/tmp/missing.jpg: no such file");
    }
}
