//! Session termination command implementation.

use std::io::Write;

use raven_proto::OutboundMessage;

use crate::client::GatewayClient;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Ack, OutputFormat};

/// Terminate command executor.
pub struct TerminateCommand<'a> {
    ctx: &'a Context,
}

impl<'a> TerminateCommand<'a> {
    /// Create a new terminate command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Ask the gateway to terminate `session_id`.
    ///
    /// The gateway does not acknowledge termination; success means the
    /// request was handed to the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or the gateway is unreachable.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        session_id: &str,
    ) -> Result<(), CliError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(CliError::InvalidArgument("session id cannot be empty".into()));
        }

        let client = GatewayClient::connect(self.ctx.link.clone(), self.ctx.timeout).await?;
        client.send(OutboundMessage::terminate_session(session_id));
        client.close().await;

        format.write(
            out,
            &Ack {
                action: "Termination requested".into(),
                target: Some(session_id.to_string()),
            },
        )
    }
}
