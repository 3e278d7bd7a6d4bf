//! viewer::gate
//!
//! Password gate in front of a protected gallery.
//!
//! # Design
//!
//! A visitor unlocks the gallery by entering a password whose SHA-256 matches
//! the stored hash. The unlock can be remembered: an [`UnlockSession`] holding
//! the hash it was granted for and an expiry is written to the SecretStore.
//! A remembered unlock only counts while it is unexpired and its hash equals
//! the gallery's current one, so changing the password locks everyone out
//! again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::access::{verify_password, AccessError};
use crate::core::collection::Collection;
use crate::core::config::DEFAULT_SESSION_HOURS;
use crate::secrets::{SecretError, SecretStore};

/// SecretStore key for the remembered unlock.
pub const UNLOCK_SECRET_KEY: &str = "viewer.unlock";

/// Errors from the password gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("could not access the unlock session: {0}")]
    Secret(#[from] SecretError),
}

/// Whether a visitor may see the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStatus {
    /// The gallery has no password.
    Open,
    /// A remembered unlock is active.
    Remembered { hours_left: i64 },
    /// The password must be entered.
    Locked,
}

impl GateStatus {
    /// Check if the gallery can be shown.
    pub fn is_unlocked(&self) -> bool {
        !matches!(self, GateStatus::Locked)
    }
}

/// A remembered unlock.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSession {
    /// Hash the unlock was granted for
    pub hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UnlockSession {
    /// Unlock for `hash` lasting `hours` from now.
    pub fn new(hash: impl Into<String>, hours: u32) -> Self {
        let now = Utc::now();
        Self {
            hash: hash.into(),
            created_at: now,
            expires_at: now + Duration::hours(i64::from(hours)),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if this unlock applies to a gallery with the given hash.
    pub fn grants(&self, hashed_password: &str) -> bool {
        !self.is_expired() && self.hash.eq_ignore_ascii_case(hashed_password)
    }

    /// Whole hours until expiry, rounded up.
    pub fn hours_left(&self) -> i64 {
        let minutes = (self.expires_at - Utc::now()).num_minutes().max(0);
        (minutes + 59) / 60
    }
}

impl std::fmt::Debug for UnlockSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockSession")
            .field("hash", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Password gate backed by a SecretStore.
pub struct PasswordGate<'a> {
    store: &'a dyn SecretStore,
    session_hours: u32,
}

impl<'a> PasswordGate<'a> {
    /// Gate remembering unlocks for the default number of hours.
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self {
            store,
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }

    /// Remember unlocks for `hours` instead.
    pub fn with_session_hours(mut self, hours: u32) -> Self {
        self.session_hours = hours;
        self
    }

    fn load(&self) -> Result<Option<UnlockSession>, GateError> {
        let Some(json) = self.store.get(UNLOCK_SECRET_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable unlock session");
                self.store.delete(UNLOCK_SECRET_KEY)?;
                Ok(None)
            }
        }
    }

    /// Decide whether the gallery can be shown without asking.
    pub fn status(&self, collection: &Collection) -> Result<GateStatus, GateError> {
        let Some(access) = collection.access() else {
            return Ok(GateStatus::Open);
        };
        let Some(session) = self.load()? else {
            return Ok(GateStatus::Locked);
        };

        if session.is_expired() {
            tracing::debug!("unlock session expired");
            self.store.delete(UNLOCK_SECRET_KEY)?;
            return Ok(GateStatus::Locked);
        }
        if session.grants(&access.hashed_password) {
            Ok(GateStatus::Remembered {
                hours_left: session.hours_left(),
            })
        } else {
            Ok(GateStatus::Locked)
        }
    }

    /// Check an entered password, remembering the unlock if asked.
    ///
    /// Surrounding whitespace in the entry is ignored.
    ///
    /// # Errors
    ///
    /// - `Access(Empty)` if nothing was entered
    /// - `Access(Mismatch)` if the password is wrong
    pub fn unlock(
        &self,
        collection: &Collection,
        entered: &str,
        remember: bool,
    ) -> Result<GateStatus, GateError> {
        let Some(access) = collection.access() else {
            return Ok(GateStatus::Open);
        };
        verify_password(entered.trim(), &access.hashed_password)?;

        if !remember {
            return Ok(GateStatus::Open);
        }
        let session = UnlockSession::new(&access.hashed_password, self.session_hours);
        let json = serde_json::to_string(&session)
            .map_err(|e| SecretError::WriteError(e.to_string()))?;
        self.store.set(UNLOCK_SECRET_KEY, &json)?;
        tracing::info!(hours = self.session_hours, "unlock remembered");
        Ok(GateStatus::Remembered {
            hours_left: session.hours_left(),
        })
    }

    /// Forget a remembered unlock.
    pub fn forget(&self) -> Result<(), GateError> {
        self.store.delete(UNLOCK_SECRET_KEY)?;
        Ok(())
    }
}
