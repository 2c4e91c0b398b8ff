//! Error types for raven-link.
//!
//! None of these cross the link's event boundary: the driver logs them and
//! folds them into the connection status.

use thiserror::Error;

/// Errors that can occur in link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The endpoint cannot be used to construct a transport.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as given.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Transport construction or I/O failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport is not open.
    #[error("not connected")]
    NotConnected,

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] raven_proto::ProtoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = LinkError::Config("max_delay_ms must not be below base_delay_ms".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: max_delay_ms must not be below base_delay_ms"
        );
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let err = LinkError::InvalidEndpoint {
            endpoint: "http://gateway".to_string(),
            reason: "scheme must be ws or wss".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid endpoint 'http://gateway': scheme must be ws or wss"
        );
    }

    #[test]
    fn test_not_connected_display() {
        assert_eq!(LinkError::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LinkError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_protocol_error_conversion() {
        let err: LinkError = raven_proto::ProtoError::Encoding("bad".into()).into();
        assert!(matches!(err, LinkError::Protocol(_)));
    }
}
