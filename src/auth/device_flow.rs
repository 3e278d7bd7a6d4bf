//! auth::device_flow
//!
//! OAuth device flow client for Google accounts.
//!
//! # Device Flow Overview
//!
//! 1. Client requests a device code
//! 2. User visits the verification URL and enters the user code
//! 3. Client polls the token endpoint until the user approves
//! 4. Client receives an access token and (usually) a refresh token
//!
//! # Polling States
//!
//! While polling, the token endpoint answers with one of:
//! - `authorization_pending` - keep polling
//! - `slow_down` - add 5 seconds to the polling interval
//! - `expired_token` - the device code expired, start over
//! - `access_denied` - the user declined
//!
//! # Silent Refresh
//!
//! [`PromptMode::Silent`] exchanges a stored refresh token for a new access
//! token without user interaction. Google keeps refresh tokens stable, so
//! the response usually carries no new one.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::auth::{GoogleDeviceFlow, IdentityProvider, PromptMode};
//!
//! let flow = GoogleDeviceFlow::new("client.apps.googleusercontent.com", None)
//!     .with_prompt(|code| println!("Visit {} and enter {}", code.verification_uri, code.user_code));
//!
//! let grant = flow.request_token(PromptMode::Interactive).await?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use super::errors::AuthError;
use super::session::DEFAULT_EXPIRES_IN_SECS;
use super::{IdentityProvider, PromptMode, TokenGrant};

/// Scope requested for gallery management: files this app created or opened.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Read-only scope, enough for viewing.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// User-Agent header for OAuth requests.
const USER_AGENT: &str = "gallerist-cli";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Callback shown the device code so the user can approve the sign-in.
pub type DevicePrompt = Arc<dyn Fn(&DeviceCodeResponse) + Send + Sync>;

/// OAuth endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub device_code: String,
    pub token: String,
    pub revoke: String,
}

impl OAuthEndpoints {
    /// Google's production endpoints.
    pub fn google() -> Self {
        Self {
            device_code: "https://oauth2.googleapis.com/device/code".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            revoke: "https://oauth2.googleapis.com/revoke".to_string(),
        }
    }

    /// Endpoints under a custom base URL, laid out like Google's.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            device_code: format!("{}/device/code", base),
            token: format!("{}/token", base),
            revoke: format!("{}/revoke", base),
        }
    }
}

/// Response from the device code endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    /// The device verification code.
    pub device_code: String,

    /// The code the user types in.
    pub user_code: String,

    /// Where the user enters the code.
    #[serde(alias = "verification_url")]
    pub verification_uri: String,

    /// Seconds until the device code expires.
    pub expires_in: u64,

    /// Minimum polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

/// Successful token response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    fn into_grant(self) -> TokenGrant {
        TokenGrant::new(
            self.access_token,
            self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            self.refresh_token,
        )
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .finish()
    }
}

/// Error response from OAuth endpoints.
#[derive(Debug, Clone, Deserialize)]
struct OAuthError {
    error: String,
    error_description: Option<String>,
}

impl OAuthError {
    fn describe(self) -> String {
        match self.error_description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", self.error, desc),
            _ => self.error,
        }
    }
}

#[derive(Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    grant_type: &'a str,
}

/// Device flow client for Google OAuth.
#[derive(Clone)]
pub struct GoogleDeviceFlow {
    client: Client,
    client_id: String,
    client_secret: Option<String>,
    scope: String,
    endpoints: OAuthEndpoints,
    prompt: Option<DevicePrompt>,
}

impl GoogleDeviceFlow {
    /// Create a client against Google's endpoints with the Drive file scope.
    pub fn new(client_id: &str, client_secret: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.map(String::from),
            scope: DRIVE_FILE_SCOPE.to_string(),
            endpoints: OAuthEndpoints::google(),
            prompt: None,
        }
    }

    /// Use different endpoints (a proxy or a test server).
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Request a different scope.
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    /// Set the callback that shows the device code to the user.
    pub fn with_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&DeviceCodeResponse) + Send + Sync + 'static,
    {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// The OAuth client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers
    }

    /// Request a device code to begin sign-in.
    ///
    /// # Errors
    ///
    /// - [`AuthError::DeviceFlowError`] if the endpoint rejects the request
    /// - [`AuthError::Network`] on connection failure
    pub async fn request_device_code(&self) -> Result<DeviceCodeResponse, AuthError> {
        let request = DeviceCodeRequest {
            client_id: &self.client_id,
            scope: &self.scope,
        };

        let response = self
            .client
            .post(&self.endpoints.device_code)
            .headers(self.headers())
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                AuthError::DeviceFlowError(format!("failed to parse device code response: {}", e))
            });
        }

        match serde_json::from_str::<OAuthError>(&body) {
            Ok(err) => Err(AuthError::DeviceFlowError(err.describe())),
            Err(_) => Err(AuthError::Provider {
                status: status.as_u16(),
                message: body,
            }),
        }
    }

    /// Poll until the user approves, declines, or the code expires.
    ///
    /// Starts at the interval from the device code response and adds five
    /// seconds every time the endpoint answers `slow_down`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Cancelled`] if the user declines
    /// - [`AuthError::DeviceFlowExpired`] if the device code expires
    pub async fn poll_for_token(
        &self,
        device_code: &DeviceCodeResponse,
    ) -> Result<TokenResponse, AuthError> {
        let deadline = Instant::now() + Duration::from_secs(device_code.expires_in);
        let mut interval = Duration::from_secs(device_code.interval);

        loop {
            if Instant::now() >= deadline {
                return Err(AuthError::DeviceFlowExpired);
            }

            sleep(interval).await;

            match self.poll_once(&device_code.device_code).await {
                Ok(tokens) => return Ok(tokens),
                Err(PollResult::Pending) => {}
                Err(PollResult::SlowDown) => interval += Duration::from_secs(5),
                Err(PollResult::Expired) => return Err(AuthError::DeviceFlowExpired),
                Err(PollResult::AccessDenied) => return Err(AuthError::Cancelled),
                Err(PollResult::Error(e)) => return Err(e),
            }
        }
    }

    async fn poll_once(&self, device_code: &str) -> Result<TokenResponse, PollResult> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_deref(),
            device_code: Some(device_code),
            refresh_token: None,
            grant_type: DEVICE_CODE_GRANT,
        };

        let response = self
            .client
            .post(&self.endpoints.token)
            .headers(self.headers())
            .form(&request)
            .send()
            .await
            .map_err(|e| PollResult::Error(AuthError::Network(e.to_string())))?;

        let body = response
            .text()
            .await
            .map_err(|e| PollResult::Error(AuthError::Network(e.to_string())))?;

        if let Ok(tokens) = serde_json::from_str::<TokenResponse>(&body) {
            return Ok(tokens);
        }

        match serde_json::from_str::<OAuthError>(&body) {
            Ok(err) => match err.error.as_str() {
                "authorization_pending" => Err(PollResult::Pending),
                "slow_down" => Err(PollResult::SlowDown),
                "expired_token" => Err(PollResult::Expired),
                "access_denied" => Err(PollResult::AccessDenied),
                _ => Err(PollResult::Error(AuthError::DeviceFlowError(err.describe()))),
            },
            Err(_) => Err(PollResult::Error(AuthError::DeviceFlowError(
                "unexpected response from token endpoint".to_string(),
            ))),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Expired`] if the refresh token was revoked or expired
    /// - [`AuthError::RefreshFailed`] for any other OAuth error
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_deref(),
            device_code: None,
            refresh_token: Some(refresh_token),
            grant_type: "refresh_token",
        };

        let response = self
            .client
            .post(&self.endpoints.token)
            .headers(self.headers())
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            if let Ok(tokens) = serde_json::from_str::<TokenResponse>(&body) {
                return Ok(tokens);
            }
        }

        match serde_json::from_str::<OAuthError>(&body) {
            Ok(err) => match err.error.as_str() {
                "invalid_grant" => Err(AuthError::Expired),
                _ => Err(AuthError::RefreshFailed(err.describe())),
            },
            Err(_) => Err(AuthError::Provider {
                status: status.as_u16(),
                message: body,
            }),
        }
    }

    /// Revoke a token (access or refresh).
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(&self.endpoints.revoke)
            .headers(self.headers())
            .form(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        match serde_json::from_str::<OAuthError>(&body) {
            // An already-revoked or expired token is as good as revoked.
            Ok(err) if err.error == "invalid_token" => Ok(()),
            Ok(err) => Err(AuthError::Provider {
                status: status.as_u16(),
                message: err.describe(),
            }),
            Err(_) => Err(AuthError::Provider {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

impl fmt::Debug for GoogleDeviceFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleDeviceFlow")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityProvider for GoogleDeviceFlow {
    async fn request_token(&self, mode: PromptMode) -> Result<TokenGrant, AuthError> {
        match mode {
            PromptMode::Silent { refresh_token } => {
                tracing::debug!("refreshing access token silently");
                Ok(self.refresh_token(&refresh_token).await?.into_grant())
            }
            PromptMode::Interactive => {
                let code = self.request_device_code().await?;
                match &self.prompt {
                    Some(prompt) => prompt(&code),
                    None => tracing::info!(
                        url = %code.verification_uri,
                        user_code = %code.user_code,
                        "waiting for device approval"
                    ),
                }
                Ok(self.poll_for_token(&code).await?.into_grant())
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.revoke_token(token).await
    }
}

/// Internal polling result states.
enum PollResult {
    Pending,
    SlowDown,
    Expired,
    AccessDenied,
    Error(AuthError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_endpoints() {
        let endpoints = OAuthEndpoints::google();
        assert_eq!(
            endpoints.device_code,
            "https://oauth2.googleapis.com/device/code"
        );
        assert_eq!(endpoints.token, "https://oauth2.googleapis.com/token");
        assert_eq!(endpoints.revoke, "https://oauth2.googleapis.com/revoke");
    }

    #[test]
    fn endpoints_with_base_trim_slash() {
        let endpoints = OAuthEndpoints::with_base("http://127.0.0.1:9000/");
        assert_eq!(endpoints.token, "http://127.0.0.1:9000/token");
    }

    #[test]
    fn headers_include_accept_json() {
        let flow = GoogleDeviceFlow::new("id", None);
        let headers = flow.headers();
        assert_eq!(
            headers.get(ACCEPT).map(|v| v.to_str().ok()),
            Some(Some("application/json"))
        );
    }

    #[test]
    fn default_scope_is_drive_file() {
        let flow = GoogleDeviceFlow::new("id", None);
        assert_eq!(flow.scope, DRIVE_FILE_SCOPE);
        let flow = flow.with_scope(DRIVE_READONLY_SCOPE);
        assert_eq!(flow.scope, DRIVE_READONLY_SCOPE);
    }

    #[test]
    fn device_code_accepts_google_field_name() {
        let json = r#"{
            "device_code": "AH-1Ng",
            "user_code": "GQVQ-JKEC",
            "verification_url": "https://www.google.com/device",
            "expires_in": 1800,
            "interval": 5
        }"#;
        let response: DeviceCodeResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(response.verification_uri, "https://www.google.com/device");
        assert_eq!(response.user_code, "GQVQ-JKEC");
    }

    #[test]
    fn device_code_interval_defaults_to_five() {
        let json = r#"{"device_code":"d","user_code":"u","verification_uri":"v","expires_in":60}"#;
        let response: DeviceCodeResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(response.interval, 5);
    }

    #[test]
    fn token_response_without_expiry_uses_default() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"ya29.x"}"#).expect("parse");
        let grant = response.into_grant();
        assert_eq!(grant.expires_in_secs, DEFAULT_EXPIRES_IN_SECS);
        assert!(grant.refresh_token.is_none());
    }

    #[test]
    fn oauth_error_description() {
        let err: OAuthError = serde_json::from_str(
            r#"{"error":"invalid_client","error_description":"The OAuth client was not found."}"#,
        )
        .expect("parse");
        assert_eq!(
            err.describe(),
            "invalid_client: The OAuth client was not found."
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let flow = GoogleDeviceFlow::new("id", Some("GOCSPX-secret"));
        assert!(!format!("{:?}", flow).contains("GOCSPX"));

        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.secret","refresh_token":"1//secret","expires_in":3599}"#,
        )
        .expect("parse");
        let out = format!("{:?}", response);
        assert!(!out.contains("ya29"));
        assert!(!out.contains("1//secret"));
    }
}
