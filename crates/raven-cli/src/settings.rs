//! Persisted gateway settings.
//!
//! The last-used gateway URL and credential live in a small JSON file,
//! by default `<config dir>/raven/settings.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// Saved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Last-used gateway URL.
    #[serde(
        rename = "raven_gateway_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_url: Option<String>,

    /// Last-used credential.
    #[serde(
        rename = "raven_gateway_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_token: Option<String>,
}

impl Settings {
    /// Apply a `settings set` invocation. Empty values clear the field.
    pub fn update(&mut self, gateway: Option<&str>, token: Option<&str>) {
        if let Some(gateway) = gateway {
            self.gateway_url = non_empty(gateway);
        }
        if let Some(token) = token {
            self.gateway_token = non_empty(token);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads and writes the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn default_location() -> Result<Self, CliError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Settings("no configuration directory on this platform".into()))?;
        Ok(Self::new(dir.join("raven").join("settings.json")))
    }

    /// Store at `path` if given, else at the default location.
    pub fn resolve(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Self::default_location(),
        }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields empty settings.
    pub fn load(&self) -> Result<Settings, CliError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file");
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(CliError::Settings(format!(
                    "failed to read '{}': {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            CliError::Settings(format!("invalid settings file '{}': {e}", self.path.display()))
        })
    }

    /// Write settings, creating the parent directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| CliError::Settings(format!("failed to encode settings: {e}")))?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Delete the settings file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, CliError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
