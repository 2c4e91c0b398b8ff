//! Best-effort decoding of inbound text frames.

use std::fmt;

use serde_json::{json, Value};

/// `type` reported for frames that were not valid JSON.
pub const RAW_TEXT_TYPE: &str = "text";

/// One inbound frame after best-effort decoding.
///
/// Decoding never fails: anything that is not valid JSON is kept verbatim
/// as [`InboundFrame::Raw`] and presented to consumers as
/// `{ "type": "text", "content": <raw> }`.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// The frame parsed as JSON.
    Structured(Value),
    /// The frame was not JSON; the original text.
    Raw(String),
}

impl InboundFrame {
    /// Decode a text frame.
    #[must_use]
    pub fn decode(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(text.to_owned()),
        }
    }

    /// Whether the frame fell back to raw text.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// The structured form consumers see.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Structured(value) => value.clone(),
            Self::Raw(text) => json!({ "type": RAW_TEXT_TYPE, "content": text }),
        }
    }

    /// The `type` discriminator, if the frame carries one.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        match self {
            Self::Structured(value) => value.get("type").and_then(Value::as_str),
            Self::Raw(_) => Some(RAW_TEXT_TYPE),
        }
    }

    /// Look up a top-level field of a structured frame.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Structured(value) => value.get(key),
            Self::Raw(_) => None,
        }
    }

    /// Human-readable text carried by the frame.
    ///
    /// Raw frames yield their text; JSON strings yield themselves; objects
    /// yield their `content` field, falling back to `message`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Structured(Value::String(text)) => Some(text),
            Self::Structured(value) => value
                .get("content")
                .and_then(Value::as_str)
                .or_else(|| value.get("message").and_then(Value::as_str)),
        }
    }
}

impl From<&str> for InboundFrame {
    fn from(text: &str) -> Self {
        Self::decode(text)
    }
}

impl fmt::Display for InboundFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_decode_structured_chat() {
        let frame = InboundFrame::decode(r#"{"type":"chat","content":"hi"}"#);

        assert!(!frame.is_raw());
        assert_eq!(frame.message_type(), Some("chat"));
        assert_eq!(frame.text(), Some("hi"));
        assert_eq!(frame.to_value(), json!({"type": "chat", "content": "hi"}));
    }

    #[test]
    fn test_decode_plain_text_falls_back() {
        let frame = InboundFrame::decode("plain text");

        assert_eq!(frame, InboundFrame::Raw("plain text".to_string()));
        assert_eq!(frame.message_type(), Some("text"));
        assert_eq!(
            frame.to_value(),
            json!({"type": "text", "content": "plain text"})
        );
    }

    #[test_case("" ; "empty frame")]
    #[test_case("{\"type\":" ; "truncated object")]
    #[test_case("hello {world}" ; "text with braces")]
    fn test_non_json_is_raw(input: &str) {
        let frame = InboundFrame::decode(input);
        assert!(frame.is_raw());
        assert_eq!(frame.text(), Some(input));
    }

    #[test]
    fn test_json_scalars_are_structured() {
        assert_eq!(InboundFrame::decode("42"), InboundFrame::Structured(json!(42)));

        let quoted = InboundFrame::decode("\"hello\"");
        assert_eq!(quoted.text(), Some("hello"));
        assert_eq!(quoted.message_type(), None);
    }

    #[test]
    fn test_text_prefers_content_over_message() {
        let frame = InboundFrame::decode(r#"{"content":"a","message":"b"}"#);
        assert_eq!(frame.text(), Some("a"));

        let frame = InboundFrame::decode(r#"{"message":"b"}"#);
        assert_eq!(frame.text(), Some("b"));

        let frame = InboundFrame::decode(r#"{"type":"metrics","rpm":3}"#);
        assert_eq!(frame.text(), None);
    }

    #[test]
    fn test_field_lookup() {
        let frame = InboundFrame::decode(r#"{"type":"metrics","rpm":22}"#);
        assert_eq!(frame.field("rpm"), Some(&json!(22)));
        assert_eq!(InboundFrame::Raw("x".into()).field("rpm"), None);
    }

    #[test]
    fn test_display_is_compact_json() {
        let frame = InboundFrame::Raw("ping".into());
        assert_eq!(frame.to_string(), r#"{"content":"ping","type":"text"}"#);
    }
}
