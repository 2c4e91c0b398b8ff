//! Outbound payloads.

use raven_proto::{OutboundMessage, ProtoError};
use serde_json::Value;

/// Something that can be sent over the link.
///
/// Strings go out verbatim; everything else is encoded as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A pre-formed text frame.
    Text(String),
    /// An arbitrary JSON value.
    Json(Value),
    /// A typed message.
    Message(OutboundMessage),
}

impl Payload {
    /// Encode into a text frame.
    pub fn encode(self) -> Result<String, ProtoError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => {
                serde_json::to_string(&value).map_err(|e| ProtoError::Encoding(e.to_string()))
            }
            Self::Message(message) => message.to_json(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<OutboundMessage> for Payload {
    fn from(message: OutboundMessage) -> Self {
        Self::Message(message)
    }
}
