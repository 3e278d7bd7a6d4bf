//! store::drive
//!
//! Google Drive v3 implementation of [`BlobStore`].
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search    | `GET  {api}/files?q=..&fields=..&orderBy=..&pageSize=..` |
//! | upload    | `POST {upload}/files?uploadType=multipart` |
//! | download  | `GET  {api}/files/{id}?alt=media` |
//! | delete    | `DELETE {api}/files/{id}` |
//! | patch     | `PATCH {upload}/files/{id}?uploadType=media` |
//!
//! # Authentication
//!
//! A bearer token is fetched from the [`TokenProvider`] before every call, so
//! an access token inside its expiry buffer is renewed first. Requests are not
//! retried.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::store::drive::DriveStore;
//! use gallerist::store::{BlobStore, FolderRef, SearchQuery};
//!
//! let store = DriveStore::new(session_manager);
//! let images = store.search(&SearchQuery::images(FolderRef::Root)).await?;
//! ```
//!
//! [`TokenProvider`]: crate::auth::TokenProvider

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::query::{SearchQuery, LISTING_PAGE_SIZE};
use super::traits::{BlobStore, RemoteFile, StoreError, UploadMetadata};
use crate::auth::{AuthError, TokenProvider};

/// Default Drive API base URL.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Default Drive upload base URL.
pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields requested for every listed file.
const LIST_FIELDS: &str = "files(id,name,size,mimeType,createdTime,thumbnailLink)";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gallerist-cli";

/// Google Drive blob store.
pub struct DriveStore {
    client: Client,
    token_provider: Arc<dyn TokenProvider>,
    api_base: String,
    upload_base: String,
}

impl std::fmt::Debug for DriveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveStore")
            .field("is_authenticated", &self.token_provider.is_authenticated())
            .field("api_base", &self.api_base)
            .field("upload_base", &self.upload_base)
            .finish()
    }
}

/// A file as Drive lists it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnail_link: Option<String>,
}

impl From<DriveFile> for RemoteFile {
    fn from(file: DriveFile) -> Self {
        RemoteFile {
            id: file.id,
            name: file.name,
            size: file
                .size
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            mime_type: file.mime_type.unwrap_or_default(),
            created_time: file.created_time,
            display_link: file.thumbnail_link,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<[&'a str; 1]>,
}

/// Drive error body: `{"error": {"code": .., "message": .., "errors": [{"reason": ..}]}}`.
#[derive(Debug, Deserialize)]
struct DriveErrorResponse {
    error: DriveErrorBody,
}

#[derive(Debug, Deserialize)]
struct DriveErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<DriveErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct DriveErrorDetail {
    #[serde(default)]
    reason: String,
}

impl DriveStore {
    /// Create a store against the public Drive endpoints.
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_urls(token_provider, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE)
    }

    /// Create a store against custom endpoints (a proxy or a test server).
    pub fn with_base_urls(
        token_provider: Arc<dyn TokenProvider>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token_provider,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            upload_base: upload_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn headers(&self) -> Result<HeaderMap, StoreError> {
        let token = self
            .token_provider
            .bearer_token()
            .await
            .map_err(|e| match e {
                AuthError::NotAuthenticated => StoreError::AuthRequired,
                other => StoreError::AuthFailed(other.to_string()),
            })?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| StoreError::AuthFailed("token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{}", self.api_base, id)
    }

    fn network(err: reqwest::Error) -> StoreError {
        StoreError::NetworkError(err.to_string())
    }

    /// Parse a JSON success body or map the error response.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| StoreError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    /// Accept any success status, discarding the body.
    async fn handle_empty_response(response: Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    async fn error_from_response(response: Response, status: StatusCode) -> StoreError {
        let (message, reasons) = match response.json::<DriveErrorResponse>().await {
            Ok(body) => (
                body.error.message,
                body.error
                    .errors
                    .into_iter()
                    .map(|d| d.reason)
                    .collect::<Vec<_>>(),
            ),
            Err(_) => ("Unknown error".to_string(), Vec::new()),
        };
        let rate_limited = reasons
            .iter()
            .any(|r| r == "rateLimitExceeded" || r == "userRateLimitExceeded");

        match status {
            StatusCode::UNAUTHORIZED => StoreError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_limited => StoreError::RateLimited,
            StatusCode::FORBIDDEN => StoreError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited,
            _ if status.is_server_error() => StoreError::ApiError {
                status: status.as_u16(),
                message: format!("Drive server error: {}", message),
            },
            _ => StoreError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl BlobStore for DriveStore {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RemoteFile>, StoreError> {
        let q = query.to_drive_query();
        let page_size = LISTING_PAGE_SIZE.to_string();
        let mut params: Vec<(&str, &str)> = vec![("q", q.as_str()), ("fields", LIST_FIELDS)];
        if let Some(order_by) = query.order_by() {
            params.push(("orderBy", order_by));
            params.push(("pageSize", page_size.as_str()));
        }

        let response = self
            .client
            .get(format!("{}/files", self.api_base))
            .headers(self.headers().await?)
            .query(&params)
            .send()
            .await
            .map_err(Self::network)?;

        let list: FileList = Self::handle_response(response).await?;
        tracing::info!(count = list.files.len(), folder = %query.folder(), "listed files");
        Ok(list.files.into_iter().map(RemoteFile::from).collect())
    }

    async fn upload(
        &self,
        content: Vec<u8>,
        metadata: UploadMetadata,
    ) -> Result<String, StoreError> {
        let create = CreateMetadata {
            name: &metadata.name,
            parents: metadata.folder.id().map(|id| [id]),
        };
        let metadata_json = serde_json::to_vec(&create).map_err(|e| StoreError::ApiError {
            status: 0,
            message: format!("Failed to encode metadata: {}", e),
        })?;

        let invalid_mime = |e: reqwest::Error| StoreError::ApiError {
            status: 0,
            message: format!("Invalid MIME type: {}", e),
        };
        let form = Form::new()
            .part(
                "metadata",
                Part::bytes(metadata_json)
                    .mime_str("application/json")
                    .map_err(invalid_mime)?,
            )
            .part(
                "file",
                Part::bytes(content)
                    .file_name(metadata.name.clone())
                    .mime_str(&metadata.mime_type)
                    .map_err(invalid_mime)?,
            );

        let response = self
            .client
            .post(format!("{}/files", self.upload_base))
            .headers(self.headers().await?)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .multipart(form)
            .send()
            .await
            .map_err(Self::network)?;

        let created: CreatedFile = Self::handle_response(response).await?;
        tracing::info!(name = %metadata.name, id = %created.id, "uploaded file");
        Ok(created.id)
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get(self.file_url(id))
            .headers(self.headers().await?)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(Self::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response, status).await);
        }
        let bytes = response.bytes().await.map_err(Self::network)?;
        tracing::info!(id, len = bytes.len(), "downloaded file");
        Ok(bytes.to_vec())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.file_url(id))
            .headers(self.headers().await?)
            .send()
            .await
            .map_err(Self::network)?;

        Self::handle_empty_response(response).await?;
        tracing::info!(id, "deleted file");
        Ok(())
    }

    async fn patch(&self, id: &str, content: Vec<u8>) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(format!("{}/files/{}", self.upload_base, id))
            .headers(self.headers().await?)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(content)
            .send()
            .await
            .map_err(Self::network)?;

        Self::handle_empty_response(response).await?;
        tracing::info!(id, "replaced file content");
        Ok(())
    }
}
