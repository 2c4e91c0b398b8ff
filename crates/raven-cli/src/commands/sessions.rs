//! Session listing command implementation.

use std::io::Write;

use raven_proto::{GatewayMessage, InboundFrame, OutboundMessage, Session};

use crate::client::GatewayClient;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, SessionList};

/// Sessions command executor.
pub struct SessionsCommand<'a> {
    ctx: &'a Context,
}

impl<'a> SessionsCommand<'a> {
    /// Create a new sessions command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Connect, fetch the session list, and print it.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable or does not answer.
    pub async fn execute<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let mut client = GatewayClient::connect(self.ctx.link.clone(), self.ctx.timeout).await?;
        let result = Self::run(&mut client, out, format).await;
        client.close().await;
        result
    }

    /// Fetch and print the session list over an established client.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway does not answer or output fails.
    pub async fn run<W: Write>(
        client: &mut GatewayClient,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let sessions = client
            .request(OutboundMessage::GetSessions, sessions_update)
            .await?;
        format.write(out, &SessionList { sessions })
    }
}

fn sessions_update(frame: &InboundFrame) -> Option<Vec<Session>> {
    match GatewayMessage::from_frame(frame)? {
        GatewayMessage::SessionsUpdate { sessions } => Some(sessions),
        _ => None,
    }
}
