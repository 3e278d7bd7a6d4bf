//! engine::media
//!
//! Operations that move image blobs between this machine, the store, and the
//! collection.
//!
//! Every operation checks what it can locally first, then performs the remote
//! call, and only touches the collection after the remote call succeeded.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use super::service::GalleryService;
use super::EngineError;
use crate::core::collection::{Collection, CollectionError};
use crate::core::model::{Image, LocalPreview};
use crate::core::types::{GroupId, ImageId};
use crate::store::{guess_mime, RemoteFile, StoreError, UploadMetadata};

/// Extra key holding a direct download URL for the blob.
pub const PATH_KEY: &str = "path";

/// Extra key holding the file name the blob was created with.
pub const ORIGINAL_NAME_KEY: &str = "originalName";

/// A file found in the folder, and whether the gallery already shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub file: RemoteFile,
    pub imported: bool,
}

fn download_url(external_ref: &str) -> String {
    format!("https://drive.google.com/uc?id={}", external_ref)
}

fn with_source_extras(mut image: Image, original_name: &str) -> Image {
    image.extra.insert(
        PATH_KEY.to_string(),
        Value::String(download_url(&image.external_ref)),
    );
    image.extra.insert(
        ORIGINAL_NAME_KEY.to_string(),
        Value::String(original_name.to_string()),
    );
    image
}

impl GalleryService {
    /// List the folder's images, marking those the gallery references.
    pub async fn scan(&self, collection: &Collection) -> Result<Vec<ScanEntry>, EngineError> {
        let files = self.list_images().await?;
        let entries: Vec<ScanEntry> = files
            .into_iter()
            .map(|file| {
                let imported = collection.contains_external_ref(&file.id);
                ScanEntry { file, imported }
            })
            .collect();
        tracing::info!(
            found = entries.len(),
            new = entries.iter().filter(|e| !e.imported).count(),
            "scanned folder"
        );
        Ok(entries)
    }

    /// Add listed files to a group.
    ///
    /// Files the gallery already references are skipped. Returns the ids of
    /// the images created, in listing order.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if the group does not exist (nothing is imported)
    pub fn import(
        &self,
        collection: &mut Collection,
        files: &[RemoteFile],
        group_id: &GroupId,
    ) -> Result<Vec<ImageId>, EngineError> {
        if collection.group(group_id).is_none() {
            return Err(CollectionError::GroupNotFound(group_id.clone()).into());
        }

        let mut added = Vec::new();
        for file in files {
            if collection.contains_external_ref(&file.id) {
                tracing::debug!(file = %file.id, "already in gallery, skipping");
                continue;
            }

            let mut image = Image::new(
                ImageId::generate(),
                &file.name,
                group_id.clone(),
                &file.id,
                file.size,
            )
            .with_date_added(Utc::now());
            if let Some(link) = &file.display_link {
                image = image.with_display_link(link);
            }
            let image = with_source_extras(image, &file.name);

            added.push(image.id.clone());
            collection.insert_image(image)?;
        }

        tracing::info!(count = added.len(), group = %group_id, "imported images");
        Ok(added)
    }

    /// Upload a local file and add it to a group.
    ///
    /// The image keeps a local preview pointing at `path` until the next
    /// load.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` before anything is read or uploaded
    /// - `Io` if the file cannot be read
    /// - `Store` if the upload fails (collection unchanged)
    pub async fn upload(
        &self,
        collection: &mut Collection,
        path: &Path,
        group_id: &GroupId,
    ) -> Result<ImageId, EngineError> {
        if collection.group(group_id).is_none() {
            return Err(CollectionError::GroupNotFound(group_id.clone()).into());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| EngineError::io(path, e))?;
        let size = content.len() as u64;
        let mime_type = guess_mime(&name);

        let metadata = UploadMetadata::new(&name, mime_type, self.folder.clone());
        let blob_id = self.store.upload(content, metadata).await?;
        tracing::info!(file = %blob_id, name = %name, size, "uploaded image");

        let image = Image::new(ImageId::generate(), &name, group_id.clone(), blob_id, size)
            .with_preview(LocalPreview::from_path(path));
        let image = with_source_extras(image, &name);
        let id = image.id.clone();
        collection.insert_image(image)?;
        Ok(id)
    }

    /// Delete an image and its blob.
    ///
    /// The blob goes first. A blob that is already gone is logged and the
    /// image is removed anyway; any other remote failure abandons the delete.
    pub async fn delete_image(
        &self,
        collection: &mut Collection,
        id: &ImageId,
    ) -> Result<Image, EngineError> {
        let external_ref = collection
            .image(id)
            .map(|img| img.external_ref.clone())
            .ok_or_else(|| CollectionError::ImageNotFound(id.clone()))?;

        match self.store.delete(&external_ref).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                tracing::warn!(image = %id, file = %external_ref, "blob already gone");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(collection.remove_image(id)?)
    }

    /// Write an image's blob to disk.
    ///
    /// When `dest` is an existing directory the file is named after the
    /// image's original name.
    pub async fn download(
        &self,
        collection: &Collection,
        id: &ImageId,
        dest: &Path,
    ) -> Result<PathBuf, EngineError> {
        let image = collection
            .image(id)
            .ok_or_else(|| CollectionError::ImageNotFound(id.clone()))?;

        let target = if dest.is_dir() {
            let file_name = image
                .extra
                .get(ORIGINAL_NAME_KEY)
                .and_then(Value::as_str)
                .unwrap_or(image.name.as_str());
            dest.join(file_name)
        } else {
            dest.to_path_buf()
        };

        let bytes = self.store.download(&image.external_ref).await?;
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| EngineError::io(&target, e))?;
        tracing::info!(image = %id, path = %target.display(), bytes = bytes.len(), "downloaded image");
        Ok(target)
    }
}
