//! # raven-proto
//!
//! Wire vocabulary spoken between Raven clients and a Moltbot gateway.
//!
//! Frames are UTF-8 text. Outbound application messages are JSON objects
//! carrying a `type` discriminator; inbound frames are decoded best-effort
//! into an [`InboundFrame`], which never fails.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod messages;
pub mod types;

pub use error::ProtoError;
pub use frame::InboundFrame;
pub use messages::{ChatReply, GatewayMessage, OutboundMessage};
pub use types::{Session, SessionStatus, UsageSample};
