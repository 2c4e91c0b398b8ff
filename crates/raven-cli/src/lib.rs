//! # raven-cli
//!
//! Terminal client for a Moltbot gateway.
//!
//! Provides commands for:
//! - Watching link status and inbound messages
//! - Chatting with the gateway over stdin
//! - Listing and terminating sessions
//! - Showing usage metrics
//! - Managing the saved gateway URL and credential
//!
//! # Architecture
//!
//! Every command talks to the gateway through a [`raven_link::GatewayLink`].
//! One-shot commands wrap it in a [`client::GatewayClient`], which waits for
//! the link to come up and matches replies to requests; `watch` drives the
//! link directly so it can ride through reconnects.
//!
//! ```text
//! ┌───────────┐   raven-link (WebSocket)   ┌─────────────────┐
//! │ raven-cli │◄──────────────────────────►│ Moltbot gateway │
//! └───────────┘                            └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod context;
pub mod error;
pub mod output;
pub mod settings;

pub use cli::{Cli, Commands, Format, SettingsCommands};
pub use client::GatewayClient;
pub use context::Context;
pub use error::CliError;
pub use output::OutputFormat;
pub use settings::{Settings, SettingsStore};
