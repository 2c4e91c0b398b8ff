//! Interactive chat command implementation.
//!
//! Each non-empty input line goes out as a chat message; every inbound
//! frame is printed as a reply. At end of input the command waits for
//! replies to messages still outstanding, then exits.

use std::io::Write;

use raven_proto::OutboundMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::client::GatewayClient;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{ChatLine, OutputFormat};

/// Chat command executor.
pub struct ChatCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ChatCommand<'a> {
    /// Create a new chat command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Connect and chat, reading lines from `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable, input cannot be
    /// read, or output fails.
    pub async fn execute<R, W>(&self, input: R, out: &mut W, format: &OutputFormat) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut client = GatewayClient::connect(self.ctx.link.clone(), self.ctx.timeout).await?;
        let result = Self::run(&mut client, input, out, format).await;
        client.close().await;
        result
    }

    /// Chat over an established client until `input` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read or output fails.
    pub async fn run<R, W>(
        client: &mut GatewayClient,
        input: R,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut outstanding: usize = 0;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    client.send(OutboundMessage::chat(line));
                    outstanding += 1;
                }
                frame = client.recv() => {
                    let Some(frame) = frame else {
                        return Err(CliError::Connection("link stopped".into()));
                    };
                    format.write_line(out, &ChatLine::from(&frame))?;
                    outstanding = outstanding.saturating_sub(1);
                }
            }
        }

        debug!(outstanding, "end of input");
        while outstanding > 0 {
            match client.next_frame().await {
                Ok(frame) => {
                    format.write_line(out, &ChatLine::from(&frame))?;
                    outstanding -= 1;
                }
                Err(CliError::Timeout(_)) => {
                    warn!(outstanding, "gave up waiting for replies");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
