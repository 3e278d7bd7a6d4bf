//! HTTP-level tests for the Drive store and the OAuth device flow.
//!
//! Each test starts a wiremock server and points the client at it, so the
//! requests and the error mapping are exercised without network access.

use std::sync::Arc;

use gallerist::auth::{
    AuthError, GoogleDeviceFlow, IdentityProvider, OAuthEndpoints, SessionManager, StaticToken,
    TokenProvider,
};
use gallerist::engine::{GalleryService, SaveOutcome};
use gallerist::secrets::MemorySecretStore;
use gallerist::store::drive::DriveStore;
use gallerist::store::{BlobStore, FolderRef, SearchQuery, StoreError, UploadMetadata};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn drive(server: &MockServer) -> DriveStore {
    DriveStore::with_base_urls(
        Arc::new(StaticToken::new("ya29.test")),
        format!("{}/drive/v3", server.uri()),
        format!("{}/upload/drive/v3", server.uri()),
    )
}

fn drive_error(code: u16, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": {
            "code": code,
            "message": format!("{} error", reason),
            "errors": [{ "reason": reason }]
        }
    }))
}

mod store {
    use super::*;

    #[tokio::test]
    async fn search_lists_images_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .and(query_param("orderBy", "name"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [
                    {
                        "id": "f1",
                        "name": "beach.jpg",
                        "size": "1536",
                        "mimeType": "image/jpeg",
                        "createdTime": "2024-05-01T10:00:00.000Z",
                        "thumbnailLink": "https://lh3.example/t1"
                    },
                    { "id": "f2", "name": "dunes.png" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let files = drive(&server)
            .search(&SearchQuery::images(FolderRef::Id("F1".into())))
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "f1");
        assert_eq!(files[0].size, 1536);
        assert_eq!(files[0].display_link.as_deref(), Some("https://lh3.example/t1"));
        assert_eq!(files[1].size, 0);
        assert_eq!(files[1].mime_type, "");
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f1"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = drive(&server).download("f1").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn upload_sends_multipart_with_parent_folder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(body_string_contains(r#""parents":["F1"]"#))
            .and(body_string_contains("image-bytes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let metadata = UploadMetadata::new("beach.jpg", "image/jpeg", FolderRef::Id("F1".into()));
        let id = drive(&server)
            .upload(b"image-bytes".to_vec(), metadata)
            .await
            .unwrap();
        assert_eq!(id, "new-1");
    }

    #[tokio::test]
    async fn patch_replaces_content() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/upload/drive/v3/files/m1"))
            .and(query_param("uploadType", "media"))
            .and(body_string_contains("projectTitle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m1" })))
            .expect(1)
            .mount(&server)
            .await;

        drive(&server)
            .patch("m1", br#"{"projectTitle":"x"}"#.to_vec())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/drive/v3/files/f1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        drive(&server).delete("f1").await.unwrap();
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/drive/v3/files/gone"))
            .respond_with(drive_error(404, "notFound"))
            .mount(&server)
            .await;

        let err = drive(&server).delete("gone").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejected_token_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f1"))
            .respond_with(drive_error(401, "authError"))
            .mount(&server)
            .await;

        let err = drive(&server).download("f1").await.unwrap_err();
        assert!(matches!(err, StoreError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn quota_errors_are_rate_limits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(drive_error(403, "userRateLimitExceeded"))
            .mount(&server)
            .await;

        let err = drive(&server)
            .search(&SearchQuery::images(FolderRef::Root))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RateLimited));
    }

    #[tokio::test]
    async fn server_errors_keep_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        match drive(&server).download("f1").await.unwrap_err() {
            StoreError::ApiError { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn requests_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        assert!(drive(&server).download("f1").await.is_err());
    }
}

mod service {
    use super::*;

    #[tokio::test]
    async fn first_save_creates_manifest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(body_string_contains("image-data.json"))
            .and(body_string_contains("Holidays"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m1" })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GalleryService::new(Arc::new(drive(&server)), FolderRef::Id("F1".into()));
        let mut gallery = service.load().await.unwrap();
        gallery.add_group("Holidays").unwrap();

        let outcome = service.save(&gallery).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Created("m1".into()));
    }

    #[tokio::test]
    async fn existing_manifest_is_loaded_and_patched() {
        let server = MockServer::start().await;
        let manifest = json!({
            "projectTitle": "Summer",
            "images": [{
                "id": "img_1",
                "name": "beach.jpg",
                "groupId": "default",
                "order": 0,
                "dateAdded": "2024-05-01T10:00:00Z",
                "description": "",
                "driveFileId": "f1",
                "size": 1536
            }],
            "groups": [{ "id": "default", "name": "Default Group", "order": 0 }]
        });

        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .and(query_param("orderBy", "name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{ "id": "f1", "name": "beach.jpg", "thumbnailLink": "https://lh3.example/fresh" }]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{ "id": "m1", "name": "image-data.json" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/m1"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/upload/drive/v3/files/m1"))
            .and(body_string_contains("Winter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m1" })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GalleryService::new(Arc::new(drive(&server)), FolderRef::Id("F1".into()));
        let mut gallery = service.load().await.unwrap();
        assert_eq!(gallery.title(), "Summer");
        assert_eq!(gallery.images().len(), 1);
        assert_eq!(
            gallery.images()[0].display_link.as_deref(),
            Some("https://lh3.example/fresh")
        );

        gallery.set_title("Winter").unwrap();
        let outcome = service.save(&gallery).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Updated("m1".into()));
    }
}

mod device_flow {
    use super::*;

    fn flow(server: &MockServer) -> GoogleDeviceFlow {
        GoogleDeviceFlow::new("client-1", Some("shh"))
            .with_endpoints(OAuthEndpoints::with_base(&server.uri()))
    }

    async fn mount_device_code(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/device/code"))
            .and(body_string_contains("client_id=client-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "device_code": "dev-123",
                "user_code": "ABCD-EFGH",
                "verification_url": "https://www.google.com/device",
                "expires_in": 60,
                "interval": 0
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn sign_in_polls_until_approved_and_stores_session() {
        let server = MockServer::start().await;
        mount_device_code(&server).await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("device_code=dev-123"))
            .respond_with(
                ResponseTemplate::new(428).set_body_json(json!({ "error": "authorization_pending" })),
            )
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("device_code=dev-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "refresh_token": "1//refresh",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let shown = Arc::new(std::sync::Mutex::new(None));
        let seen = Arc::clone(&shown);
        let identity = flow(&server).with_prompt(move |code| {
            *seen.lock().unwrap() = Some(code.user_code.clone());
        });
        let manager = SessionManager::new(
            "client-1",
            Arc::new(identity),
            Box::new(MemorySecretStore::new()),
        );

        let session = manager.sign_in().await.unwrap();
        assert!(session.is_valid());
        assert_eq!(shown.lock().unwrap().as_deref(), Some("ABCD-EFGH"));
        assert!(manager.is_authenticated());
        assert_eq!(manager.bearer_token().await.unwrap(), "ya29.fresh");
    }

    #[tokio::test]
    async fn declined_sign_in_is_cancelled() {
        let server = MockServer::start().await;
        mount_device_code(&server).await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "error": "access_denied" })),
            )
            .mount(&server)
            .await;

        let manager = SessionManager::new(
            "client-1",
            Arc::new(flow(&server)),
            Box::new(MemorySecretStore::new()),
        );
        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
        assert!(manager.session().is_none());
    }

    #[tokio::test]
    async fn revoked_refresh_token_means_sign_in_again() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let err = flow(&server).refresh_token("1//old").await.unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert!(err.needs_reauth());
    }

    #[tokio::test]
    async fn revoking_an_invalid_token_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/revoke"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_token" })),
            )
            .mount(&server)
            .await;

        flow(&server).revoke("ya29.stale").await.unwrap();
    }
}
