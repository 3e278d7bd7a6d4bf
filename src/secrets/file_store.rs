//! secrets::file_store
//!
//! File-based secret storage.
//!
//! # Security
//!
//! - Secrets live in `~/.gallerist/secrets.toml` as a flat key/value table
//! - File permissions are set to 0600 on Unix before any content is written
//! - Writes go to a sibling temp file which is then renamed over the target
//! - Values are never logged or included in error messages
//!
//! # Example
//!
//! ```no_run
//! use gallerist::secrets::{FileSecretStore, SecretStore};
//!
//! let store = FileSecretStore::new()?;
//! store.set("google.session", "{...}")?;
//! # Ok::<(), gallerist::secrets::SecretError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// Directory under the home directory holding gallerist state.
const STATE_DIR: &str = ".gallerist";

/// File name of the secrets table.
const SECRETS_FILE: &str = "secrets.toml";

/// Secret store backed by a TOML file.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at `~/.gallerist/secrets.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self {
            path: home.join(STATE_DIR).join(SECRETS_FILE),
        })
    }

    /// Store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the secrets file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("cannot parse secrets file: {}", e)))
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), SecretError> {
        let write_err = |what: &str, e: &dyn std::fmt::Display| {
            SecretError::WriteError(format!("{}: {}", what, e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err("cannot create directory", &e))?;
        }

        let content =
            toml::to_string_pretty(table).map_err(|e| write_err("cannot serialize secrets", &e))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| write_err("cannot create temp file", &e))?;

            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| write_err("cannot set permissions", &e))?;

            file.write_all(content.as_bytes())
                .map_err(|e| write_err("cannot write secrets", &e))?;
            file.sync_all()
                .map_err(|e| write_err("cannot sync to disk", &e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| write_err("cannot rename temp file", &e))
    }

    /// Check that the file is absent or readable by its owner only.
    #[cfg(unix)]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let metadata = fs::metadata(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read file metadata: {}", e)))?;
        Ok(metadata.permissions().mode() & 0o777 == 0o600)
    }

    /// Check that the file is absent or readable by its owner only.
    #[cfg(not(unix))]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        Ok(true)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.read_table()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut table = self.read_table()?;
        if table.remove(key).is_none() {
            return Ok(());
        }
        self.write_table(&table)
    }
}
