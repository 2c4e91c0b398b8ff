//! Link configuration.
//!
//! Everything has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```json
//! {
//!   "endpoint": "wss://gateway.example.com/ws",
//!   "credential": "secret",
//!   "reconnect": { "base_delay_ms": 1000, "max_attempts": 30 },
//!   "error_close_grace_ms": 10000
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::reconnect::ReconnectConfig;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:18789";

/// Default wait for a close after a transport error, in milliseconds.
pub const DEFAULT_ERROR_CLOSE_GRACE_MS: u64 = 10_000;

/// Configuration for a [`GatewayLink`](crate::GatewayLink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Gateway WebSocket URL.
    pub endpoint: String,
    /// Credential attached to the URL and sent in the identify message.
    pub credential: Option<String>,
    /// Retry policy.
    pub reconnect: ReconnectConfig,
    /// How long to wait for a close after a transport error before treating
    /// the connection as lost. `null` waits indefinitely.
    pub error_close_grace_ms: Option<u64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credential: None,
            reconnect: ReconnectConfig::default(),
            error_close_grace_ms: Some(DEFAULT_ERROR_CLOSE_GRACE_MS),
        }
    }
}

impl LinkConfig {
    /// Create a configuration for `endpoint` with default policy.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the credential.
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the error-close grace period; `None` disables it.
    #[must_use]
    pub fn with_error_close_grace(mut self, grace: Option<Duration>) -> Self {
        self.error_close_grace_ms = grace.map(|d| d.as_millis() as u64);
        self
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinkError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LinkError::Config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or fails validation.
    pub fn from_json(content: &str) -> Result<Self, LinkError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| LinkError::Config(format!("invalid JSON: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// The endpoint itself is not checked here: a malformed endpoint is a
    /// construction failure reported through the link status.
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.endpoint.trim().is_empty() {
            return Err(LinkError::Config("endpoint cannot be empty".to_string()));
        }

        if self.error_close_grace_ms == Some(0) {
            return Err(LinkError::Config(
                "error_close_grace_ms must be greater than 0 (use null to disable)".to_string(),
            ));
        }

        self.reconnect.validate()
    }

    /// Error-close grace period, if enabled.
    #[must_use]
    pub fn error_close_grace(&self) -> Option<Duration> {
        self.error_close_grace_ms.map(Duration::from_millis)
    }
}
