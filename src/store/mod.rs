//! store
//!
//! Remote storage for images and the manifest.
//!
//! # Architecture
//!
//! The [`BlobStore`] trait is the only way the rest of the crate touches the
//! remote side. Two implementations exist:
//!
//! - [`drive::DriveStore`]: Google Drive v3 REST API over `reqwest`
//! - [`mock::MockStore`]: in-memory store for tests
//!
//! Every call is a single attempt. Callers abandon the operation on error and
//! leave the collection untouched.

pub mod drive;
pub mod mock;
pub mod query;
mod traits;

pub use query::{extract_folder_id, FolderRef, SearchQuery};
pub use traits::*;

/// MIME type for a file name, by extension.
///
/// # Example
///
/// ```
/// use gallerist::store::guess_mime;
///
/// assert_eq!(guess_mime("IMG_0001.JPG"), "image/jpeg");
/// assert_eq!(guess_mime("image-data.json"), "application/json");
/// assert_eq!(guess_mime("notes"), "application/octet-stream");
/// ```
pub fn guess_mime(name: &str) -> String {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
    .to_string()
}
