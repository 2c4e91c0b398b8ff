//! Protocol message definitions.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ProtoError;
use crate::frame::InboundFrame;
use crate::types::{Session, UsageSample};

/// Messages sent from a client to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A chat line typed by the user.
    Chat {
        /// Message text.
        message: String,
        /// Client timestamp in milliseconds since the Unix epoch.
        timestamp: i64,
    },
    /// Identification sent right after the link opens.
    ///
    /// The credential field is named `token`, matching the query
    /// parameter: `{"type":"identify","token":"..."}`.
    Identify {
        /// Bearer credential.
        token: String,
    },
    /// Request the current session list.
    GetSessions,
    /// Request a usage sample.
    GetMetrics,
    /// Terminate a session.
    TerminateSession {
        /// Session to terminate.
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

impl OutboundMessage {
    /// Create a chat message stamped with the current time.
    #[must_use]
    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Create an identify message.
    #[must_use]
    pub fn identify(token: impl Into<String>) -> Self {
        Self::Identify {
            token: token.into(),
        }
    }

    /// Create a terminate-session request.
    #[must_use]
    pub fn terminate_session(session_id: impl Into<String>) -> Self {
        Self::TerminateSession {
            session_id: session_id.into(),
        }
    }

    /// The `type` discriminator on the wire.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Identify { .. } => "identify",
            Self::GetSessions => "get_sessions",
            Self::GetMetrics => "get_metrics",
            Self::TerminateSession { .. } => "terminate_session",
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Parse from a JSON text frame.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}

/// A conversational reply from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Speaker role, when the gateway reports one.
    pub role: Option<String>,
    /// Reply text.
    pub content: String,
}

/// Typed view over the inbound messages clients act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayMessage {
    /// Full session list.
    SessionsUpdate {
        /// Sessions known to the gateway.
        sessions: Vec<Session>,
    },
    /// Usage sample (`metrics` or `usage` on the wire).
    Usage {
        /// The sample.
        sample: UsageSample,
    },
    /// Text addressed to the user.
    Chat {
        /// The reply.
        reply: ChatReply,
    },
}

impl GatewayMessage {
    /// Interpret a decoded frame.
    ///
    /// Returns `None` for frames no client view acts on, including a
    /// `sessions_update` whose `sessions` field is not a valid list.
    #[must_use]
    pub fn from_frame(frame: &InboundFrame) -> Option<Self> {
        match frame.message_type() {
            Some("sessions_update") => {
                let sessions = frame.field("sessions")?;
                serde_json::from_value(sessions.clone())
                    .ok()
                    .map(|sessions| Self::SessionsUpdate { sessions })
            }
            Some("metrics" | "usage") => Some(Self::Usage {
                sample: UsageSample::from_value(&frame.to_value()),
            }),
            _ => frame.text().map(|content| Self::Chat {
                reply: ChatReply {
                    role: frame
                        .field("role")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_owned),
                    content: content.to_owned(),
                },
            }),
        }
    }
}
