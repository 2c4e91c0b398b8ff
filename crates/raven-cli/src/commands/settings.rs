//! Settings command implementation.

use std::io::Write;

use crate::cli::SettingsCommands;
use crate::error::CliError;
use crate::output::{Ack, OutputFormat, SettingsView};
use crate::settings::{Settings, SettingsStore};

/// Settings command executor.
pub struct SettingsCommand<'a> {
    store: &'a SettingsStore,
}

impl<'a> SettingsCommand<'a> {
    /// Create a new settings command.
    #[must_use]
    pub const fn new(store: &'a SettingsStore) -> Self {
        Self { store }
    }

    /// Execute the settings command.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or written.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &SettingsCommands,
    ) -> Result<(), CliError> {
        match command {
            SettingsCommands::Show => {
                let settings = self.store.load()?;
                format.write(out, &self.view(&settings))
            }
            SettingsCommands::Set { gateway, token } => {
                if gateway.is_none() && token.is_none() {
                    return Err(CliError::InvalidArgument(
                        "nothing to set, pass --gateway and/or --token".into(),
                    ));
                }
                let mut settings = self.store.load()?;
                settings.update(gateway.as_deref(), token.as_deref());
                self.store.save(&settings)?;
                format.write(out, &self.view(&settings))
            }
            SettingsCommands::Clear => {
                let existed = self.store.clear()?;
                format.write(
                    out,
                    &Ack {
                        action: if existed {
                            "Settings cleared".into()
                        } else {
                            "No saved settings".into()
                        },
                        target: Some(self.store.path().display().to_string()),
                    },
                )
            }
        }
    }

    fn view(&self, settings: &Settings) -> SettingsView {
        SettingsView {
            path: self.store.path().display().to_string(),
            gateway_url: settings.gateway_url.clone(),
            has_token: settings.gateway_token.is_some(),
        }
    }
}
