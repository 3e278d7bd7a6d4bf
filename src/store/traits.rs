//! store::traits
//!
//! BlobStore trait definition for the remote storage holding images and the
//! manifest.
//!
//! # Design
//!
//! The `BlobStore` trait is async because every operation is network I/O.
//! Implementations make exactly one attempt per call; a failure is surfaced to
//! the caller, which abandons the operation without touching the collection.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::store::{BlobStore, FolderRef, SearchQuery};
//!
//! async fn list(store: &dyn BlobStore) -> Result<(), StoreError> {
//!     let files = store.search(&SearchQuery::images(FolderRef::Root)).await?;
//!     for file in files {
//!         println!("{} ({} bytes)", file.name, file.size);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::query::{FolderRef, SearchQuery};

/// Errors from blob store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No credentials are available.
    #[error("authentication required")]
    AuthRequired,

    /// Credentials were rejected (invalid, expired, insufficient scope).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// The store returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A file as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Store-assigned identifier
    pub id: String,
    /// File name
    pub name: String,
    /// Size in bytes (0 when the store does not report one)
    pub size: u64,
    /// MIME type
    pub mime_type: String,
    /// Creation time, if reported
    pub created_time: Option<DateTime<Utc>>,
    /// Short-lived thumbnail link, if the store issued one
    pub display_link: Option<String>,
}

/// Metadata for a new file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    /// File name
    pub name: String,
    /// MIME type of the content
    pub mime_type: String,
    /// Folder to create the file in
    pub folder: FolderRef,
}

impl UploadMetadata {
    /// Metadata for a file in the given folder.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, folder: FolderRef) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            folder,
        }
    }
}

/// Remote storage for images and the manifest.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// - `AuthRequired` / `AuthFailed`: ask the user to sign in again
/// - `NotFound`: the file is gone
/// - everything else: report and abandon the operation
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the store name (e.g., "drive", "mock").
    fn name(&self) -> &'static str;

    /// List files matching a query.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RemoteFile>, StoreError>;

    /// Create a file and return its id.
    async fn upload(&self, content: Vec<u8>, metadata: UploadMetadata)
        -> Result<String, StoreError>;

    /// Download a file's content.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file doesn't exist
    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file doesn't exist
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Replace a file's content, keeping its id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file doesn't exist
    async fn patch(&self, id: &str, content: Vec<u8>) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        assert_eq!(
            format!("{}", StoreError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", StoreError::NotFound("file 1AbC".into())),
            "not found: file 1AbC"
        );
        assert_eq!(
            format!(
                "{}",
                StoreError::ApiError {
                    status: 500,
                    message: "backend error".into()
                }
            ),
            "API error: 500 - backend error"
        );
        assert_eq!(
            format!("{}", StoreError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }

    #[test]
    fn upload_metadata_new() {
        let meta = UploadMetadata::new("a.jpg", "image/jpeg", FolderRef::Root);
        assert_eq!(meta.name, "a.jpg");
        assert_eq!(meta.folder, FolderRef::Root);
    }
}
