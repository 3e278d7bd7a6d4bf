//! store::mock
//!
//! In-memory blob store for deterministic testing.
//!
//! # Design
//!
//! The mock keeps files in memory keyed by id, answers searches by
//! evaluating the query directly, records every call, and can be told to fail
//! a specific operation.
//!
//! # Example
//!
//! ```
//! use gallerist::store::mock::MockStore;
//! use gallerist::store::{BlobStore, FolderRef, SearchQuery, UploadMetadata};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MockStore::new();
//! let id = store
//!     .upload(b"jpeg".to_vec(), UploadMetadata::new("a.jpg", "image/jpeg", FolderRef::Root))
//!     .await
//!     .unwrap();
//!
//! let files = store.search(&SearchQuery::images(FolderRef::Root)).await.unwrap();
//! assert_eq!(files[0].id, id);
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::guess_mime;
use super::query::{FolderRef, SearchQuery};
use super::traits::{BlobStore, RemoteFile, StoreError, UploadMetadata};

/// Mock store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

#[derive(Debug)]
struct MockStoreInner {
    /// Stored files by id.
    files: BTreeMap<String, StoredFile>,
    /// Next numeric suffix for generated ids.
    next_id: u64,
    /// Operation to fail on.
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    meta: RemoteFile,
    folder: FolderRef,
    content: Vec<u8>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Search(StoreError),
    Upload(StoreError),
    Download(StoreError),
    Delete(StoreError),
    Patch(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Search { query: SearchQuery },
    Upload { name: String, folder: FolderRef },
    Download { id: String },
    Delete { id: String },
    Patch { id: String, len: usize },
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockStoreInner {
                files: BTreeMap::new(),
                next_id: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Seed a file with a fixed id (test setup, not recorded).
    ///
    /// A display link of the form `https://lh3.googleusercontent.com/<id>` is
    /// attached to image files.
    pub fn with_file(
        self,
        id: &str,
        name: &str,
        folder: FolderRef,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let content = content.into();
            let mime_type = guess_mime(name);
            let display_link = mime_type
                .starts_with("image/")
                .then(|| format!("https://lh3.googleusercontent.com/{}", id));
            inner.files.insert(
                id.to_string(),
                StoredFile {
                    meta: RemoteFile {
                        id: id.to_string(),
                        name: name.to_string(),
                        size: content.len() as u64,
                        mime_type,
                        created_time: Some(Utc::now()),
                        display_link,
                    },
                    folder,
                    content,
                },
            );
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.set_fail_on(fail_on);
        self
    }

    /// Configure a failure on a shared handle.
    pub fn set_fail_on(&self, fail_on: FailOn) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = Some(fail_on);
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Content of a stored file (for test verification).
    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.files.get(id).map(|f| f.content.clone())
    }

    /// Check if a file exists (for test verification).
    pub fn contains(&self, id: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.files.contains_key(id)
    }

    /// Number of stored files.
    pub fn file_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.files.len()
    }

    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    fn check_fail(&self, expected: &str) -> Result<(), StoreError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::Search(e)) if expected == "search" => Err(e.clone()),
            Some(FailOn::Upload(e)) if expected == "upload" => Err(e.clone()),
            Some(FailOn::Download(e)) if expected == "download" => Err(e.clone()),
            Some(FailOn::Delete(e)) if expected == "delete" => Err(e.clone()),
            Some(FailOn::Patch(e)) if expected == "patch" => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MockStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RemoteFile>, StoreError> {
        self.record(MockOperation::Search {
            query: query.clone(),
        });
        self.check_fail("search")?;

        let inner = self.inner.lock().unwrap();
        let mut files: Vec<RemoteFile> = inner
            .files
            .values()
            .filter(|f| &f.folder == query.folder() && query.matches(&f.meta))
            .map(|f| f.meta.clone())
            .collect();
        if query.order_by() == Some("name") {
            files.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(files)
    }

    async fn upload(
        &self,
        content: Vec<u8>,
        metadata: UploadMetadata,
    ) -> Result<String, StoreError> {
        self.record(MockOperation::Upload {
            name: metadata.name.clone(),
            folder: metadata.folder.clone(),
        });
        self.check_fail("upload")?;

        let mut inner = self.inner.lock().unwrap();
        let id = format!("mock-file-{}", inner.next_id);
        inner.next_id += 1;
        let display_link = metadata
            .mime_type
            .starts_with("image/")
            .then(|| format!("https://lh3.googleusercontent.com/{}", id));
        inner.files.insert(
            id.clone(),
            StoredFile {
                meta: RemoteFile {
                    id: id.clone(),
                    name: metadata.name,
                    size: content.len() as u64,
                    mime_type: metadata.mime_type,
                    created_time: Some(Utc::now()),
                    display_link,
                },
                folder: metadata.folder,
                content,
            },
        );
        Ok(id)
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        self.record(MockOperation::Download { id: id.to_string() });
        self.check_fail("download")?;

        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(id)
            .map(|f| f.content.clone())
            .ok_or_else(|| StoreError::NotFound(format!("file {}", id)))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(MockOperation::Delete { id: id.to_string() });
        self.check_fail("delete")?;

        let mut inner = self.inner.lock().unwrap();
        inner
            .files
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("file {}", id)))
    }

    async fn patch(&self, id: &str, content: Vec<u8>) -> Result<(), StoreError> {
        self.record(MockOperation::Patch {
            id: id.to_string(),
            len: content.len(),
        });
        self.check_fail("patch")?;

        let mut inner = self.inner.lock().unwrap();
        let file = inner
            .files
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("file {}", id)))?;
        file.meta.size = content.len() as u64;
        file.content = content;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_download() {
        let store = MockStore::new();
        let id = store
            .upload(
                b"data".to_vec(),
                UploadMetadata::new("a.png", "image/png", FolderRef::Root),
            )
            .await
            .unwrap();
        assert_eq!(store.download(&id).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn search_is_scoped_to_folder() {
        let store = MockStore::new()
            .with_file("1", "a.jpg", FolderRef::Root, "x")
            .with_file("2", "b.jpg", FolderRef::Id("F".into()), "y");
        let found = store
            .search(&SearchQuery::images(FolderRef::Id("F".into())))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[tokio::test]
    async fn image_search_is_sorted_by_name() {
        let store = MockStore::new()
            .with_file("1", "c.jpg", FolderRef::Root, "x")
            .with_file("2", "a.jpg", FolderRef::Root, "x")
            .with_file("3", "image-data.json", FolderRef::Root, "{}");
        let names: Vec<String> = store
            .search(&SearchQuery::images(FolderRef::Root))
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = MockStore::new()
            .with_file("1", "a.jpg", FolderRef::Root, "x")
            .fail_on(FailOn::Delete(StoreError::RateLimited));
        assert_eq!(store.delete("1").await, Err(StoreError::RateLimited));
        assert!(store.contains("1"));

        store.clear_fail_on();
        store.delete("1").await.unwrap();
        assert!(!store.contains("1"));
    }

    #[tokio::test]
    async fn operations_are_recorded() {
        let store = MockStore::new();
        let _ = store.download("nope").await;
        assert_eq!(
            store.operations(),
            vec![MockOperation::Download { id: "nope".into() }]
        );
    }

    #[tokio::test]
    async fn patch_missing_file() {
        let store = MockStore::new();
        assert!(matches!(
            store.patch("nope", vec![]).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
