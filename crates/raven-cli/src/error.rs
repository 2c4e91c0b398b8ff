//! CLI error types.

use raven_link::LinkError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Gateway connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The gateway did not answer in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// Settings file error.
    #[error("settings error: {0}")]
    Settings(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Link error.
    #[error(transparent)]
    Link(#[from] LinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_connection() {
        let err = CliError::Connection("gateway unreachable".into());
        assert_eq!(err.to_string(), "connection error: gateway unreachable");
    }

    #[test]
    fn cli_error_display_timeout() {
        let err = CliError::Timeout("no sessions_update within 10s".into());
        assert_eq!(err.to_string(), "timed out: no sessions_update within 10s");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }

    #[test]
    fn cli_error_from_link_error_is_transparent() {
        let err = CliError::from(LinkError::Config("bad".into()));
        assert_eq!(err.to_string(), "configuration error: bad");
    }
}
