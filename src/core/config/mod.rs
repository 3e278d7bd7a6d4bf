//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (`--folder`, `--client-id`; not handled here)
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$GALLERIST_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gallerist/config.toml`
//! 3. `~/.gallerist/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use gallerist::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Manifest: {}", config.manifest_name());
//! match config.folder_id() {
//!     Some(id) => println!("Folder: {}", id),
//!     None => println!("Folder: root"),
//! }
//! ```

pub mod schema;

pub use schema::{GalleryConfig, SecretsConfig, ViewerConfig, CONFIG_KEYS};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::collection::DEFAULT_PROJECT_TITLE;
use crate::store::query::extract_folder_id;

/// Manifest file name used when none is configured.
pub const DEFAULT_MANIFEST_NAME: &str = "image-data.json";

/// Hours a viewer stays unlocked when none is configured.
pub const DEFAULT_SESSION_HOURS: u32 = 24;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration plus the file it came from.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: GalleryConfig,
    /// Path to the config file (if one was loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            // An explicit location that does not exist yet is where `save` writes.
            None => Ok(Self {
                file: GalleryConfig::default(),
                path: std::env::var_os("GALLERIST_CONFIG").map(PathBuf::from),
            }),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// First existing config file in precedence order.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GALLERIST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gallerist/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(".gallerist/config.toml");
        path.exists().then_some(path)
    }

    fn read_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical config path (`~/.gallerist/config.toml`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".gallerist/config.toml"))
    }

    /// Write the config back to where it was loaded from, or to the
    /// canonical path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };
        Self::write_config_atomic(&path, &self.file)?;
        Ok(path)
    }

    /// Write a config file atomically (temp file, then rename).
    pub fn write_config_atomic(path: &Path, config: &GalleryConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    /// OAuth client id, if configured.
    pub fn client_id(&self) -> Option<&str> {
        self.file.client_id.as_deref()
    }

    /// OAuth client secret, if configured.
    pub fn client_secret(&self) -> Option<&str> {
        self.file.client_secret.as_deref()
    }

    /// Storage folder id extracted from the configured URL or id.
    ///
    /// `None` means the root folder.
    pub fn folder_id(&self) -> Option<String> {
        self.file
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(extract_folder_id)
    }

    /// Manifest file name. Defaults to `image-data.json`.
    pub fn manifest_name(&self) -> &str {
        self.file
            .manifest_name
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_NAME)
    }

    /// Title for a new gallery. Defaults to "My Gallery".
    pub fn default_title(&self) -> &str {
        self.file
            .default_title
            .as_deref()
            .unwrap_or(DEFAULT_PROJECT_TITLE)
    }

    /// Get the secrets provider. Defaults to "file".
    pub fn secrets_provider(&self) -> &str {
        self.file
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// Hours an unlocked viewer stays unlocked. Defaults to 24.
    pub fn session_hours(&self) -> u32 {
        self.file
            .viewer
            .as_ref()
            .and_then(|v| v.session_hours)
            .unwrap_or(DEFAULT_SESSION_HOURS)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
