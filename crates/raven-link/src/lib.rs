//! # raven-link
//!
//! A resilient client link to a Moltbot gateway.
//!
//! [`GatewayLink`] keeps one connection open at a time, fans inbound frames
//! and status changes out to registered observers, and reconnects after
//! unexpected closures with jittered exponential backoff until a retry
//! budget is exhausted.
//!
//! ```no_run
//! use raven_link::{GatewayLink, LinkConfig, LinkStatus};
//!
//! # async fn demo() {
//! let link = GatewayLink::websocket(LinkConfig::new("ws://127.0.0.1:18789"));
//! let _status = link.on_status_change(|status| println!("link is {status}"));
//! let _frames = link.on_message(|frame| println!("<- {frame}"));
//!
//! link.connect(None, Some("secret"));
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod link;
pub mod observers;
pub mod payload;
pub mod reconnect;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::LinkConfig;
pub use endpoint::LinkTarget;
pub use error::LinkError;
pub use events::{EventSink, TransportEvent};
pub use link::GatewayLink;
pub use observers::{ObserverSet, Subscription};
pub use payload::Payload;
pub use reconnect::ReconnectConfig;
pub use state::{LinkStatus, ReconnectPhase, Transition};
pub use transport::{Connection, Transport, WsTransport};
