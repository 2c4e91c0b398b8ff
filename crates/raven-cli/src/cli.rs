//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Raven - terminal client for a Moltbot gateway.
#[derive(Parser, Debug, Clone)]
#[command(name = "raven")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gateway URL to connect to (overrides saved settings).
    #[arg(short, long, env = "RAVEN_GATEWAY")]
    pub gateway: Option<String>,

    /// Gateway credential (overrides saved settings).
    #[arg(long, env = "RAVEN_GATEWAY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Settings file holding the last-used gateway and credential.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Link configuration file (JSON).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the gateway to connect or answer.
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print every status change and inbound message until interrupted.
    Watch,

    /// Chat with the gateway: each stdin line is sent as a chat message.
    Chat,

    /// List sessions known to the gateway.
    Sessions,

    /// Show a usage sample.
    Metrics,

    /// Terminate a session.
    Terminate {
        /// Session ID to terminate.
        session_id: String,
    },

    /// Send a raw payload (JSON or plain text).
    Send {
        /// Payload to send; valid JSON is sent as-is, anything else as text.
        payload: String,

        /// Wait for and print the first inbound message.
        #[arg(short, long)]
        wait: bool,
    },

    /// Manage saved gateway settings.
    Settings {
        /// Settings subcommand to execute.
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

/// Settings subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Show saved settings.
    Show,

    /// Save gateway URL and/or credential.
    Set {
        /// Gateway URL to save.
        #[arg(long)]
        gateway: Option<String>,

        /// Credential to save; an empty value clears it.
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove saved settings.
    Clear,
}
