//! auth::session
//!
//! Persisted sign-in session.
//!
//! # Design
//!
//! A session stores the access token with its absolute expiry and, when the
//! provider issued one, a refresh token used for silent renewal. The token is
//! treated as usable only while more than [`EXPIRY_BUFFER_SECS`] remain, or
//! half its lifetime for tokens shorter than twice the buffer. The moment it
//! stops being usable is also the moment it is due for renewal.
//!
//! # Security
//!
//! Token values never appear in `Debug` output.
//!
//! # Example
//!
//! ```
//! use gallerist::auth::{SessionBundle, TokenGrant};
//!
//! let grant = TokenGrant::new("ya29.token", 3600, Some("1//refresh".into()));
//! let session = SessionBundle::from_grant("client.apps.googleusercontent.com", grant);
//!
//! assert!(!session.needs_refresh());
//! assert!(!format!("{:?}", session).contains("ya29"));
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use super::TokenGrant;

/// Kind identifier for session bundles.
pub const SESSION_BUNDLE_KIND: &str = "gallerist.google-oauth";

/// Current schema version for session bundles.
pub const SESSION_BUNDLE_VERSION: u32 = 1;

/// SecretStore key holding the session.
pub const SESSION_SECRET_KEY: &str = "google.session";

/// A token is treated as expired this many seconds before its real expiry.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Lifetime assumed when the provider does not report one.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Longest lifetime accepted from a provider; larger values are clamped.
pub const MAX_EXPIRES_IN_SECS: u64 = 30 * 24 * 3600;

/// Seconds after issue at which a token should be renewed.
///
/// Renewal happens five minutes before expiry, but never earlier than half
/// the lifetime so short-lived tokens are not refreshed immediately.
///
/// # Example
///
/// ```
/// use gallerist::auth::refresh_delay_secs;
///
/// assert_eq!(refresh_delay_secs(3600), 3300);
/// assert_eq!(refresh_delay_secs(400), 200);
/// ```
pub fn refresh_delay_secs(expires_in_secs: u64) -> u64 {
    let lifetime = expires_in_secs.min(MAX_EXPIRES_IN_SECS);
    lifetime - expiry_buffer_secs(lifetime)
}

/// Seconds before expiry at which a token stops being usable.
fn expiry_buffer_secs(lifetime: u64) -> u64 {
    (EXPIRY_BUFFER_SECS as u64).min(lifetime / 2)
}

/// Session stored in the SecretStore.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionBundle {
    /// Bundle type identifier.
    pub kind: String,

    /// Schema version for forward compatibility.
    pub schema_version: u32,

    /// OAuth client the tokens were issued to.
    pub client_id: String,

    /// Tokens with expiry.
    pub tokens: SessionTokens,

    /// When the session was created and last renewed.
    pub timestamps: SessionTimestamps,
}

/// Token values of a session.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    /// Seconds the access token was issued for.
    pub expires_in_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionTokens {
    fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Self {
        let lifetime = grant.expires_in_secs.min(MAX_EXPIRES_IN_SECS);
        Self {
            access_token_expires_at: now + Duration::seconds(lifetime as i64),
            expires_in_secs: lifetime,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
        }
    }
}

impl SessionBundle {
    /// Create a session from a freshly issued grant.
    pub fn from_grant(client_id: &str, grant: TokenGrant) -> Self {
        let now = Utc::now();
        Self {
            kind: SESSION_BUNDLE_KIND.to_string(),
            schema_version: SESSION_BUNDLE_VERSION,
            client_id: client_id.to_string(),
            tokens: SessionTokens::from_grant(grant, now),
            timestamps: SessionTimestamps {
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Check whether the access token is due for renewal (or expired).
    pub fn needs_refresh(&self) -> bool {
        Utc::now() >= self.refresh_due_at()
    }

    /// Check whether the access token can be used right now.
    pub fn is_token_valid(&self) -> bool {
        !self.needs_refresh()
    }

    /// Check whether a silent refresh is possible.
    pub fn can_refresh(&self) -> bool {
        self.tokens.refresh_token.is_some()
    }

    /// Check whether the session is usable, directly or after a refresh.
    pub fn is_valid(&self) -> bool {
        self.is_token_valid() || self.can_refresh()
    }

    /// When the access token should be renewed.
    pub fn refresh_due_at(&self) -> DateTime<Utc> {
        let lifetime = self.tokens.expires_in_secs.min(MAX_EXPIRES_IN_SECS);
        self.tokens.access_token_expires_at - Duration::seconds(expiry_buffer_secs(lifetime) as i64)
    }

    /// Whole minutes until the access token expires (zero once expired).
    pub fn remaining_minutes(&self) -> i64 {
        (self.tokens.access_token_expires_at - Utc::now())
            .num_minutes()
            .max(0)
    }

    /// Renew the tokens from a refresh grant.
    ///
    /// Providers often omit the refresh token on renewal; the previous one is
    /// kept in that case.
    pub fn with_refreshed_tokens(&self, grant: TokenGrant) -> Self {
        let now = Utc::now();
        let previous_refresh = self.tokens.refresh_token.clone();
        let mut tokens = SessionTokens::from_grant(grant, now);
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = previous_refresh;
        }
        Self {
            kind: self.kind.clone(),
            schema_version: self.schema_version,
            client_id: self.client_id.clone(),
            tokens,
            timestamps: SessionTimestamps {
                created_at: self.timestamps.created_at,
                updated_at: now,
            },
        }
    }

    /// Parse a session from JSON, checking kind and version.
    pub fn parse(json: &str) -> Result<Self, AuthError> {
        let bundle: Self = serde_json::from_str(json)?;

        if bundle.kind != SESSION_BUNDLE_KIND {
            return Err(AuthError::InvalidBundle(format!(
                "unexpected kind '{}', expected '{}'",
                bundle.kind, SESSION_BUNDLE_KIND
            )));
        }
        if bundle.schema_version != SESSION_BUNDLE_VERSION {
            return Err(AuthError::InvalidBundle(format!(
                "unsupported schema version {}, expected {}",
                bundle.schema_version, SESSION_BUNDLE_VERSION
            )));
        }
        Ok(bundle)
    }

    /// Serialize the session to JSON.
    pub fn to_json(&self) -> Result<String, AuthError> {
        serde_json::to_string_pretty(self).map_err(|e| AuthError::InvalidBundle(e.to_string()))
    }
}

impl fmt::Debug for SessionBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBundle")
            .field("kind", &self.kind)
            .field("schema_version", &self.schema_version)
            .field("client_id", &self.client_id)
            .field("tokens", &self.tokens)
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("expires_in_secs", &self.expires_in_secs)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
