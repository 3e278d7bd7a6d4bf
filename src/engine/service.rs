//! engine::service
//!
//! Loading and saving a gallery through a blob store.
//!
//! # Load
//!
//! 1. Look the manifest up by name in the folder
//! 2. If present, download it and list the folder's images
//! 3. Decode, overlaying fresh display links from the listing
//!
//! A missing manifest yields a fresh collection. An unreadable one is logged
//! and also yields a fresh collection, so a corrupt file never blocks the
//! user; it is replaced on the next save.
//!
//! # Save
//!
//! The manifest is looked up again at save time and patched in place when it
//! exists, created otherwise. Last write wins.

use std::sync::Arc;

use super::EngineError;
use crate::core::collection::{Collection, DEFAULT_PROJECT_TITLE};
use crate::core::config::DEFAULT_MANIFEST_NAME;
use crate::manifest;
use crate::store::{BlobStore, FolderRef, RemoteFile, SearchQuery, UploadMetadata};
use crate::viewer;

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new manifest file was created.
    Created(String),
    /// The existing manifest file was replaced.
    Updated(String),
}

impl SaveOutcome {
    /// Id of the manifest file.
    pub fn file_id(&self) -> &str {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => id,
        }
    }
}

/// Gallery operations against one folder of a blob store.
pub struct GalleryService {
    pub(super) store: Arc<dyn BlobStore>,
    pub(super) folder: FolderRef,
    manifest_name: String,
    default_title: String,
}

impl std::fmt::Debug for GalleryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryService")
            .field("store", &self.store.name())
            .field("folder", &self.folder)
            .field("manifest_name", &self.manifest_name)
            .finish_non_exhaustive()
    }
}

impl GalleryService {
    /// Service for a folder with the default manifest name and title.
    pub fn new(store: Arc<dyn BlobStore>, folder: FolderRef) -> Self {
        Self {
            store,
            folder,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            default_title: DEFAULT_PROJECT_TITLE.to_string(),
        }
    }

    /// Use a different manifest file name.
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Title given to galleries created from scratch.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// The folder this service works in.
    pub fn folder(&self) -> &FolderRef {
        &self.folder
    }

    /// The manifest file name.
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    /// Find the manifest file, if it exists.
    pub async fn find_manifest(&self) -> Result<Option<RemoteFile>, EngineError> {
        let query = SearchQuery::by_name(&self.manifest_name, self.folder.clone());
        let mut found = self.store.search(&query).await?;
        if found.len() > 1 {
            tracing::warn!(
                count = found.len(),
                name = %self.manifest_name,
                "several manifests in folder, using the first"
            );
        }
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// List the image files in the folder, ordered by name.
    pub async fn list_images(&self) -> Result<Vec<RemoteFile>, EngineError> {
        let query = SearchQuery::images(self.folder.clone());
        Ok(self.store.search(&query).await?)
    }

    /// Load the gallery.
    ///
    /// # Errors
    ///
    /// Remote failures only. A missing or unreadable manifest produces a
    /// fresh collection instead.
    pub async fn load(&self) -> Result<Collection, EngineError> {
        let Some(file) = self.find_manifest().await? else {
            tracing::info!(folder = %self.folder, "no manifest found, starting a new gallery");
            return Ok(manifest::fresh_collection(&self.default_title));
        };

        let listing = self.list_images().await?;
        self.decode(&file, &listing).await
    }

    /// Load what a visitor sees: the gallery plus the folder's images it
    /// does not reference.
    ///
    /// Without a manifest every image in the folder is shown. The result is
    /// for display and should not be saved.
    pub async fn load_for_viewing(&self) -> Result<Collection, EngineError> {
        let found = self.find_manifest().await?;
        let listing = self.list_images().await?;
        let collection = match found {
            Some(file) => viewer::merge_listing(&self.decode(&file, &listing).await?, &listing),
            None => {
                tracing::info!(folder = %self.folder, "no manifest found, showing the folder");
                viewer::folder_only(&self.default_title, &listing)
            }
        };
        Ok(collection)
    }

    async fn decode(
        &self,
        file: &RemoteFile,
        listing: &[RemoteFile],
    ) -> Result<Collection, EngineError> {
        let bytes = self.store.download(&file.id).await?;
        let json = String::from_utf8_lossy(&bytes);

        let collection = manifest::load_or_default(&json, listing, &self.default_title);
        tracing::info!(
            images = collection.images().len(),
            groups = collection.groups().len(),
            "loaded gallery"
        );
        Ok(collection)
    }

    /// Save the gallery, replacing the manifest or creating it.
    pub async fn save(&self, collection: &Collection) -> Result<SaveOutcome, EngineError> {
        let json = manifest::to_json(collection)?;

        let outcome = match self.find_manifest().await? {
            Some(file) => {
                self.store.patch(&file.id, json.into_bytes()).await?;
                SaveOutcome::Updated(file.id)
            }
            None => {
                let metadata = UploadMetadata::new(
                    &self.manifest_name,
                    "application/json",
                    self.folder.clone(),
                );
                let id = self.store.upload(json.into_bytes(), metadata).await?;
                SaveOutcome::Created(id)
            }
        };
        tracing::info!(id = outcome.file_id(), "saved gallery");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{FailOn, MockOperation, MockStore};
    use crate::store::StoreError;

    fn service(store: &MockStore) -> GalleryService {
        GalleryService::new(Arc::new(store.clone()), FolderRef::Root)
    }

    const MANIFEST: &str = r#"{
        "projectTitle": "Holidays",
        "images": [
            {"id":"img_1","name":"a.jpg","groupId":"default","order":0,
             "externalRef":"f1","displayLink":"https://stale/1"}
        ],
        "groups": [{"id":"default","name":"Default Group","order":0}]
    }"#;

    #[tokio::test]
    async fn load_without_manifest_is_fresh() {
        let store = MockStore::new();
        let gallery = service(&store)
            .with_default_title("Portfolio")
            .load()
            .await
            .unwrap();
        assert_eq!(gallery.title(), "Portfolio");
        assert!(gallery.images().is_empty());
        assert_eq!(gallery.groups().len(), 1);
    }

    #[tokio::test]
    async fn load_overlays_fresh_links() {
        let store = MockStore::new()
            .with_file("m", "image-data.json", FolderRef::Root, MANIFEST)
            .with_file("f1", "a.jpg", FolderRef::Root, "jpeg");
        let gallery = service(&store).load().await.unwrap();

        assert_eq!(gallery.title(), "Holidays");
        assert_eq!(
            gallery.images()[0].display_link.as_deref(),
            Some("https://lh3.googleusercontent.com/f1")
        );
    }

    #[tokio::test]
    async fn corrupt_manifest_falls_back() {
        let store = MockStore::new().with_file("m", "image-data.json", FolderRef::Root, "{nope");
        let gallery = service(&store).load().await.unwrap();
        assert_eq!(gallery.title(), DEFAULT_PROJECT_TITLE);
    }

    #[tokio::test]
    async fn load_surfaces_remote_failure() {
        let store = MockStore::new().fail_on(FailOn::Search(StoreError::RateLimited));
        let err = service(&store).load().await.unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::RateLimited)));
    }

    #[tokio::test]
    async fn viewing_folder_without_manifest_shows_all_images() {
        let store = MockStore::new()
            .with_file("f1", "a.jpg", FolderRef::Root, "jpeg")
            .with_file("f2", "b.png", FolderRef::Root, "png");
        let svc = service(&store);

        assert!(svc.load().await.unwrap().images().is_empty());

        let shown = svc.load_for_viewing().await.unwrap();
        let names: Vec<&str> = shown.images().iter().map(|img| img.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(shown.groups()[0].name, viewer::FOLDER_GROUP_NAME);
    }

    #[tokio::test]
    async fn viewing_adds_unreferenced_images_to_default_group() {
        let store = MockStore::new()
            .with_file("m", "image-data.json", FolderRef::Root, MANIFEST)
            .with_file("f1", "a.jpg", FolderRef::Root, "jpeg")
            .with_file("f2", "b.png", FolderRef::Root, "png");
        let shown = service(&store).load_for_viewing().await.unwrap();

        assert_eq!(shown.title(), "Holidays");
        let default: Vec<&str> = shown
            .images_in_group(&crate::core::types::GroupId::default_group())
            .iter()
            .map(|img| img.external_ref.as_str())
            .collect();
        assert_eq!(default, vec!["f1", "f2"]);
        assert!(!store
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::Patch { .. } | MockOperation::Upload { .. })));
    }

    #[tokio::test]
    async fn save_creates_then_updates() {
        let store = MockStore::new();
        let svc = service(&store);
        let mut gallery = svc.load().await.unwrap();

        let first = svc.save(&gallery).await.unwrap();
        assert!(matches!(first, SaveOutcome::Created(_)));

        gallery.set_title("Renamed").unwrap();
        let second = svc.save(&gallery).await.unwrap();
        assert_eq!(second, SaveOutcome::Updated(first.file_id().to_string()));
        assert_eq!(store.file_count(), 1);

        let reloaded = svc.load().await.unwrap();
        assert_eq!(reloaded.title(), "Renamed");
    }

    #[tokio::test]
    async fn save_respects_manifest_name_and_folder() {
        let store = MockStore::new();
        let folder = FolderRef::Id("F1".into());
        let svc = GalleryService::new(Arc::new(store.clone()), folder.clone())
            .with_manifest_name("gallery.json");
        svc.save(&Collection::new()).await.unwrap();

        assert!(store.operations().contains(&MockOperation::Upload {
            name: "gallery.json".into(),
            folder,
        }));
    }

    #[tokio::test]
    async fn failed_save_reports_error() {
        let store = MockStore::new().fail_on(FailOn::Upload(StoreError::NetworkError(
            "connection reset".into(),
        )));
        let err = service(&store).save(&Collection::new()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
