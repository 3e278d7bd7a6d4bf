//! secrets::traits
//!
//! The key-value interface behind the sign-in session and the viewer unlock.
//!
//! Two values live here: the OAuth session under `google.session` and the
//! remembered viewer unlock under `viewer.unlock`. Both are JSON documents
//! owned by their callers; a store only moves strings in and out.

use thiserror::Error;

/// Errors from a secret store. Messages name keys or paths, never values.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secret: {0}")]
    ReadError(String),

    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// The configured provider is unknown or cannot be used here.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Storage for session values.
///
/// Values are stored as given, under keys like `google.session`.
pub trait SecretStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never set or was deleted.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Remove a value. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}
