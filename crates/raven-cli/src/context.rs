//! Per-invocation context: which gateway to talk to and how long to wait.

use std::time::Duration;

use raven_link::LinkConfig;

use crate::cli::Cli;
use crate::error::CliError;
use crate::settings::{Settings, SettingsStore};

/// Resolved invocation context.
#[derive(Debug, Clone)]
pub struct Context {
    /// Link configuration with endpoint and credential resolved.
    pub link: LinkConfig,
    /// Connect and request timeout.
    pub timeout: Duration,
}

impl Context {
    /// Resolve the context from command-line flags.
    ///
    /// Endpoint and credential come from the flags, then the saved
    /// settings, then the configuration file (or built-in defaults).
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let settings = SettingsStore::resolve(cli.settings.as_deref())?.load()?;
        let base = match &cli.config {
            Some(path) => LinkConfig::from_file(path)?,
            None => LinkConfig::default(),
        };

        Ok(Self {
            link: resolve_link(base, &settings, cli.gateway.as_deref(), cli.token.as_deref()),
            timeout: Duration::from_secs(cli.timeout),
        })
    }
}

/// Layer flag and saved values over a base configuration.
#[must_use]
pub fn resolve_link(
    mut base: LinkConfig,
    settings: &Settings,
    gateway: Option<&str>,
    token: Option<&str>,
) -> LinkConfig {
    if let Some(endpoint) = gateway
        .filter(|g| !g.is_empty())
        .or(settings.gateway_url.as_deref())
    {
        base.endpoint = endpoint.to_string();
    }

    match token.or(settings.gateway_token.as_deref()) {
        Some("") => base.credential = None,
        Some(token) => base.credential = Some(token.to_string()),
        None => {}
    }

    base
}
