//! Endpoint and credential handling.

use raven_proto::OutboundMessage;
use url::Url;

/// Query parameter carrying the credential.
pub const TOKEN_PARAM: &str = "token";

/// Where the link connects and with which credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Gateway URL as configured.
    pub endpoint: String,
    /// Credential, if any.
    pub credential: Option<String>,
}

impl LinkTarget {
    /// Create a target.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, credential: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential,
        }
    }

    /// Apply the overrides passed to a connect call.
    ///
    /// A non-empty endpoint replaces the current one. A credential replaces
    /// the current one; an empty credential clears it.
    pub fn update(&mut self, endpoint: Option<&str>, credential: Option<&str>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.endpoint = endpoint.to_string();
        }
        if let Some(credential) = credential {
            self.credential = (!credential.is_empty()).then(|| credential.to_string());
        }
    }

    /// The URL actually dialed: the endpoint with the credential attached.
    ///
    /// Endpoints that do not parse as URLs get the parameter appended
    /// textually so the transport can report the construction failure.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let Some(credential) = self.credential.as_deref() else {
            return self.endpoint.clone();
        };

        if let Ok(mut url) = Url::parse(&self.endpoint) {
            url.query_pairs_mut().append_pair(TOKEN_PARAM, credential);
            return url.to_string();
        }

        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        let encoded: String = url::form_urlencoded::byte_serialize(credential.as_bytes()).collect();
        format!("{}{separator}{TOKEN_PARAM}={encoded}", self.endpoint)
    }

    /// Identify message to send once the transport opens.
    #[must_use]
    pub fn identify_message(&self) -> Option<OutboundMessage> {
        self.credential.as_deref().map(OutboundMessage::identify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_no_credential_leaves_endpoint_untouched() {
        let target = LinkTarget::new("ws://127.0.0.1:18789", None);
        assert_eq!(target.connection_url(), "ws://127.0.0.1:18789");
        assert!(target.identify_message().is_none());
    }

    #[test_case("ws://gw:18789/ws", "secret", "ws://gw:18789/ws?token=secret" ; "plain")]
    #[test_case("wss://gw/ws?room=a", "secret", "wss://gw/ws?room=a&token=secret" ; "existing query")]
    #[test_case("ws://gw/ws", "a b&c", "ws://gw/ws?token=a+b%26c" ; "encoded value")]
    fn test_parsed_endpoint(endpoint: &str, credential: &str, expected: &str) {
        let target = LinkTarget::new(endpoint, Some(credential.to_string()));
        assert_eq!(target.connection_url(), expected);
    }

    #[test_case("gateway.local", "gateway.local?token=tok" ; "no query")]
    #[test_case("gateway.local?x=1", "gateway.local?x=1&token=tok" ; "existing query")]
    fn test_unparseable_endpoint_gets_manual_query(endpoint: &str, expected: &str) {
        let target = LinkTarget::new(endpoint, Some("tok".to_string()));
        assert_eq!(target.connection_url(), expected);
    }

    #[test]
    fn test_update_overrides() {
        let mut target = LinkTarget::new("ws://a", Some("one".to_string()));

        target.update(None, None);
        assert_eq!(target, LinkTarget::new("ws://a", Some("one".to_string())));

        target.update(Some(""), Some("two"));
        assert_eq!(target, LinkTarget::new("ws://a", Some("two".to_string())));

        target.update(Some("ws://b"), Some(""));
        assert_eq!(target, LinkTarget::new("ws://b", None));
    }

    #[test]
    fn test_identify_message_carries_credential() {
        let target = LinkTarget::new("ws://gw", Some("secret".to_string()));
        assert_eq!(
            target.identify_message(),
            Some(OutboundMessage::identify("secret"))
        );
    }
}
