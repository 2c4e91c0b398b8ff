//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`watch`] - Stream status changes and inbound messages
//! - [`chat`] - Interactive chat over stdin
//! - [`sessions`] - Session listing
//! - [`metrics`] - Usage sample
//! - [`terminate`] - Session termination
//! - [`send`] - Raw payloads
//! - [`settings`] - Saved gateway settings

pub mod chat;
pub mod metrics;
pub mod send;
pub mod sessions;
pub mod settings;
pub mod terminate;
pub mod watch;

pub use chat::ChatCommand;
pub use metrics::MetricsCommand;
pub use send::SendCommand;
pub use sessions::SessionsCommand;
pub use settings::SettingsCommand;
pub use terminate::TerminateCommand;
pub use watch::WatchCommand;
