//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `$GALLERIST_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gallerist/config.toml`
//! 3. `~/.gallerist/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. the manifest name must be
//! a plain file name).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Keys accepted by `gallerist config get/set`.
pub const CONFIG_KEYS: &[&str] = &[
    "client_id",
    "client_secret",
    "folder",
    "manifest_name",
    "default_title",
    "secrets.provider",
    "viewer.session_hours",
];

/// User configuration.
///
/// # Example
///
/// ```toml
/// client_id = "1234.apps.googleusercontent.com"
/// folder = "https://drive.google.com/drive/folders/1AbCdEf"
/// manifest_name = "image-data.json"
///
/// [secrets]
/// provider = "file"
///
/// [viewer]
/// session_hours = 24
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// OAuth client id registered with Google
    pub client_id: Option<String>,

    /// OAuth client secret (device-flow clients are issued one)
    pub client_secret: Option<String>,

    /// Storage folder as a Drive URL or bare id (root when unset)
    pub folder: Option<String>,

    /// File name of the manifest inside the folder
    pub manifest_name: Option<String>,

    /// Title given to a gallery created from scratch
    pub default_title: Option<String>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,

    /// Viewer settings
    pub viewer: Option<ViewerConfig>,
}

impl GalleryConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.manifest_name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "manifest_name cannot be empty".to_string(),
                ));
            }
            if name.contains('/') || name.contains('\'') {
                return Err(ConfigError::InvalidValue(format!(
                    "manifest_name '{}' must be a plain file name",
                    name
                )));
            }
        }

        if let Some(client_id) = &self.client_id {
            if client_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "client_id cannot be empty".to_string(),
                ));
            }
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }
        if let Some(viewer) = &self.viewer {
            viewer.validate()?;
        }

        Ok(())
    }

    /// Read a value by dotted key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownKey` for keys not in [`CONFIG_KEYS`].
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "client_id" => self.client_id.clone(),
            "client_secret" => self.client_secret.clone(),
            "folder" => self.folder.clone(),
            "manifest_name" => self.manifest_name.clone(),
            "default_title" => self.default_title.clone(),
            "secrets.provider" => self.secrets.as_ref().and_then(|s| s.provider.clone()),
            "viewer.session_hours" => self
                .viewer
                .as_ref()
                .and_then(|v| v.session_hours)
                .map(|h| h.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a value by dotted key, then re-validate.
    ///
    /// # Errors
    ///
    /// - `UnknownKey` for keys not in [`CONFIG_KEYS`]
    /// - `InvalidValue` if the value does not parse or validate
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.to_string();
        match key {
            "client_id" => self.client_id = Some(value),
            "client_secret" => self.client_secret = Some(value),
            "folder" => self.folder = Some(value),
            "manifest_name" => self.manifest_name = Some(value),
            "default_title" => self.default_title = Some(value),
            "secrets.provider" => {
                self.secrets.get_or_insert_with(Default::default).provider = Some(value)
            }
            "viewer.session_hours" => {
                let hours: u32 = value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "viewer.session_hours must be a whole number, got '{}'",
                        value
                    ))
                })?;
                self.viewer.get_or_insert_with(Default::default).session_hours = Some(hours);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.validate()
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file" or "memory")
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file", "memory"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// How long an unlocked gallery stays unlocked
    pub session_hours: Option<u32>,
}

impl ViewerConfig {
    /// Validate the viewer configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_hours == Some(0) {
            return Err(ConfigError::InvalidValue(
                "viewer.session_hours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
