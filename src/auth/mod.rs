//! auth - Signing in to the storage provider
//!
//! # Architecture
//!
//! - [`IdentityProvider`] issues tokens: interactively (device flow) or
//!   silently from a stored refresh token, and revokes them
//! - [`SessionManager`] persists the resulting [`SessionBundle`] in the
//!   SecretStore and hands out bearer tokens through [`TokenProvider`]
//! - [`GoogleDeviceFlow`] is the production identity provider
//!
//! # Security
//!
//! Tokens never appear in logs, error messages, or `Debug` output. Every
//! type holding one implements a redacting `Debug`.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::auth::{GoogleDeviceFlow, SessionManager, TokenProvider};
//! use std::sync::Arc;
//!
//! let identity = Arc::new(GoogleDeviceFlow::new(client_id, None));
//! let manager = Arc::new(SessionManager::new(client_id, identity, store));
//!
//! let store = DriveStore::new(manager.clone());
//! ```

mod device_flow;
mod errors;
mod provider;
mod session;

use std::fmt;

pub use device_flow::{
    DeviceCodeResponse, DevicePrompt, GoogleDeviceFlow, OAuthEndpoints, TokenResponse,
    DRIVE_FILE_SCOPE, DRIVE_READONLY_SCOPE,
};
pub use errors::AuthError;
pub use provider::SessionManager;
pub use session::{
    refresh_delay_secs, SessionBundle, SessionTimestamps, SessionTokens, DEFAULT_EXPIRES_IN_SECS,
    EXPIRY_BUFFER_SECS, SESSION_BUNDLE_KIND, SESSION_BUNDLE_VERSION, SESSION_SECRET_KEY,
};

/// How a token request may involve the user.
#[derive(Clone, PartialEq, Eq)]
pub enum PromptMode {
    /// Ask the user to approve access.
    Interactive,
    /// Renew without user interaction.
    Silent {
        /// Previously issued refresh token
        refresh_token: String,
    },
}

impl fmt::Debug for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptMode::Interactive => f.write_str("Interactive"),
            PromptMode::Silent { .. } => f.write_str("Silent { refresh_token: [REDACTED] }"),
        }
    }
}

/// Tokens issued by an identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in_secs: u64,
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    pub fn new(
        access_token: impl Into<String>,
        expires_in_secs: u64,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in_secs,
            refresh_token,
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("expires_in_secs", &self.expires_in_secs)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Issues and revokes access tokens.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain a token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Cancelled`] if the user declines
    /// - [`AuthError::Expired`] if a silent renewal is refused
    async fn request_token(&self, mode: PromptMode) -> Result<TokenGrant, AuthError>;

    /// Revoke a token so it can no longer be used.
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;
}

/// Provides bearer tokens to the blob store.
///
/// Implementors renew tokens transparently and never log them.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a usable bearer token, renewing it first if necessary.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no session exists
    /// - [`AuthError::Expired`] if the session cannot be renewed
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a usable session exists without contacting the provider.
    fn is_authenticated(&self) -> bool;
}

/// Fixed token, for tests and one-off scripts.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }

    fn is_authenticated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_buffer_is_five_minutes() {
        assert_eq!(EXPIRY_BUFFER_SECS, 300);
    }

    #[test]
    fn session_bundle_kind() {
        assert_eq!(SESSION_BUNDLE_KIND, "gallerist.google-oauth");
        assert_eq!(SESSION_BUNDLE_VERSION, 1);
    }

    #[test]
    fn prompt_mode_debug_redacts_refresh_token() {
        let mode = PromptMode::Silent {
            refresh_token: "1//secret".into(),
        };
        assert!(!format!("{:?}", mode).contains("secret"));
    }

    #[test]
    fn grant_debug_redacts() {
        let grant = TokenGrant::new("ya29.secret", 3599, Some("1//secret".into()));
        let out = format!("{:?}", grant);
        assert!(!out.contains("ya29"));
        assert!(out.contains("3599"));
    }

    #[tokio::test]
    async fn static_token() {
        let provider = StaticToken::new("t");
        assert!(provider.is_authenticated());
        assert_eq!(provider.bearer_token().await.unwrap(), "t");
        assert_eq!(format!("{:?}", provider), "StaticToken([REDACTED])");
    }
}
