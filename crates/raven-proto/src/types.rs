//! Payload types carried inside gateway messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a client session on the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is in use.
    Active,
    /// Session is connected but idle.
    Idle,
    /// Session was terminated.
    Terminated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Idle => write!(f, "idle"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// A session as reported in a `sessions_update` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current state.
    pub status: SessionStatus,
    /// Device the session is attached from.
    #[serde(default)]
    pub device: String,
    /// Last activity, as reported by the gateway.
    #[serde(default)]
    pub last_active: String,
}

/// USD per input token used for the rough cost estimate.
const INPUT_TOKEN_COST: f64 = 0.000_000_5;
/// USD per output token used for the rough cost estimate.
const OUTPUT_TOKEN_COST: f64 = 0.000_001_5;

/// One usage sample from a `metrics` or `usage` message.
///
/// Gateways disagree on field names, so both the short (`input`) and long
/// (`inputTokens`) spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageSample {
    /// Input tokens consumed.
    pub input_tokens: Option<u64>,
    /// Output tokens produced.
    pub output_tokens: Option<u64>,
    /// Request latency in milliseconds.
    pub latency_ms: Option<f64>,
    /// Requests per minute.
    pub rpm: Option<f64>,
}

impl UsageSample {
    /// Extract a sample from a decoded message body.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let first_u64 = |keys: &[&str]| keys.iter().find_map(|k| value.get(*k)?.as_u64());
        let first_f64 = |keys: &[&str]| keys.iter().find_map(|k| value.get(*k)?.as_f64());

        Self {
            input_tokens: first_u64(&["input", "inputTokens"]),
            output_tokens: first_u64(&["output", "outputTokens"]),
            latency_ms: first_f64(&["latency"]),
            rpm: first_f64(&["rpm"]),
        }
    }

    /// Input plus output tokens, treating missing values as zero.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .unwrap_or(0)
            .saturating_add(self.output_tokens.unwrap_or(0))
    }

    /// Rough request cost in USD.
    #[must_use]
    pub fn estimated_cost_usd(&self) -> f64 {
        self.input_tokens.unwrap_or(0) as f64 * INPUT_TOKEN_COST
            + self.output_tokens.unwrap_or(0) as f64 * OUTPUT_TOKEN_COST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_deserializes_camel_case() {
        let session: Session = serde_json::from_value(json!({
            "id": "s-1",
            "name": "laptop",
            "status": "active",
            "device": "macOS",
            "lastActive": "2 mins ago"
        }))
        .expect("valid session");

        assert_eq!(session.id, "s-1");
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.last_active, "2 mins ago");
    }

    #[test]
    fn test_session_optional_fields_default() {
        let session: Session =
            serde_json::from_value(json!({"id": "s-2", "name": "cli", "status": "idle"}))
                .expect("valid session");
        assert!(session.device.is_empty());
        assert!(session.last_active.is_empty());
    }

    #[test]
    fn test_total_tokens_saturates() {
        let sample = UsageSample::from_value(&json!({"input": u64::MAX, "output": 1}));
        assert_eq!(sample.total_tokens(), u64::MAX);
        assert!(sample.estimated_cost_usd().is_finite());
    }

    #[test]
    fn test_session_status_display() {
        assert_eq!(SessionStatus::Terminated.to_string(), "terminated");
    }

    #[test]
    fn test_usage_sample_accepts_both_spellings() {
        let short = UsageSample::from_value(&json!({"input": 150, "output": 200}));
        let long = UsageSample::from_value(&json!({"inputTokens": 150, "outputTokens": 200}));

        assert_eq!(short, long);
        assert_eq!(short.total_tokens(), 350);
    }

    #[test]
    fn test_usage_sample_latency_and_rpm() {
        let sample = UsageSample::from_value(&json!({"latency": 45, "rpm": 22.5}));
        assert_eq!(sample.latency_ms, Some(45.0));
        assert_eq!(sample.rpm, Some(22.5));
        assert_eq!(sample.input_tokens, None);
    }

    #[test]
    fn test_usage_sample_cost_estimate() {
        let sample = UsageSample {
            input_tokens: Some(1_000_000),
            output_tokens: Some(1_000_000),
            ..Default::default()
        };
        assert!((sample.estimated_cost_usd() - 2.0).abs() < 1e-9);
    }
}
