//! secrets
//!
//! Secret storage for the sign-in session and the viewer unlock session.
//!
//! # Architecture
//!
//! Secrets are stored through the `SecretStore` trait:
//!
//! - [`FileSecretStore`]: Stores in `~/.gallerist/secrets.toml` (default)
//! - [`MemorySecretStore`]: Process-local map (`provider = "memory"`), used
//!   by tests
//!
//! # Security
//!
//! - Secrets are **never** logged or included in error messages
//! - File store uses 0600 permissions on Unix (owner read/write only)
//! - All writes are atomic (temp file + rename)
//!
//! # Example
//!
//! ```
//! use gallerist::secrets::{MemorySecretStore, SecretStore};
//!
//! let store = MemorySecretStore::new();
//! store.set("google.session", "{...}").unwrap();
//! assert!(store.exists("google.session").unwrap());
//! store.delete("google.session").unwrap();
//! assert!(store.get("google.session").unwrap().is_none());
//! ```

mod file_store;
mod memory_store;
mod traits;

pub use file_store::FileSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::{SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store based on the provider name.
///
/// # Providers
///
/// - `"file"` (default): [`FileSecretStore`] storing in `~/.gallerist/secrets.toml`
/// - `"memory"`: [`MemorySecretStore`], nothing survives the process
///
/// # Errors
///
/// - Unknown provider name
/// - Initialization errors from the store
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        "memory" => Ok(Box::new(MemorySecretStore::new())),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file, memory)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_memory_store() {
        let store = create_store("memory").expect("create memory store");
        assert!(store.get("nonexistent").expect("get").is_none());
    }

    #[test]
    fn create_unknown_provider() {
        match create_store("keychain") {
            Err(SecretError::ProviderNotAvailable(msg)) => {
                assert!(msg.contains("keychain"));
            }
            Err(e) => panic!("unexpected error type: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn default_provider_constant() {
        assert_eq!(DEFAULT_PROVIDER, "file");
    }
}
