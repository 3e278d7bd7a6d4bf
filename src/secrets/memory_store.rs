//! secrets::memory_store
//!
//! In-memory secret storage.

use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::{SecretError, SecretStore};

/// Secret store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> SecretError {
        SecretError::ReadError("memory store lock poisoned".into())
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let data = self.data.lock().map_err(|_| Self::poisoned())?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut data = self.data.lock().map_err(|_| Self::poisoned())?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut data = self.data.lock().map_err(|_| Self::poisoned())?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemorySecretStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert!(!store.exists("k").unwrap());
    }
}
