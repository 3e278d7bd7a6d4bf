//! auth::errors
//!
//! Error types for signing in to the storage provider.
//!
//! # Design
//!
//! Error messages never contain token values. Variants carry enough context
//! to tell the user what to do next (usually: sign in again).
//!
//! # Example
//!
//! ```
//! use gallerist::auth::AuthError;
//!
//! let err = AuthError::NotAuthenticated;
//! assert!(err.to_string().contains("gallerist auth login"));
//! assert!(err.needs_reauth());
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session is stored.
    #[error("not signed in. Run 'gallerist auth login'.")]
    NotAuthenticated,

    /// The session expired and cannot be refreshed silently.
    #[error("session expired. Run 'gallerist auth login' again.")]
    Expired,

    /// No OAuth client id is configured.
    #[error("no OAuth client id configured. Set one with 'gallerist config set client_id <id>' or --client-id.")]
    MissingClientId,

    /// Silent token refresh failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Device flow error during sign-in.
    #[error("device flow error: {0}")]
    DeviceFlowError(String),

    /// The user declined access.
    #[error("sign-in cancelled by user")]
    Cancelled,

    /// The device code expired before the user approved it.
    #[error("device code expired. Please try again.")]
    DeviceFlowExpired,

    /// Stored session is invalid or cannot be parsed.
    #[error("invalid session bundle: {0}")]
    InvalidBundle(String),

    /// Error from secret storage.
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// Network error during authentication.
    #[error("network error: {0}")]
    Network(String),

    /// The identity endpoint returned an unexpected response.
    #[error("identity provider error: {status} - {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Error message from the endpoint
        message: String,
    },
}

impl AuthError {
    /// Check if this error is resolved by running `gallerist auth login`.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated
                | AuthError::Expired
                | AuthError::Cancelled
                | AuthError::DeviceFlowExpired
        )
    }

    /// Check if this error might succeed when tried again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::SecretStore(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::InvalidBundle(err.to_string())
    }
}
