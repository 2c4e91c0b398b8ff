//! Watch command implementation.
//!
//! Streams status changes and inbound frames until stopped. Unlike the
//! one-shot commands, watch rides through reconnects and only fails once
//! the link has given up.

use std::future::Future;
use std::io::Write;

use raven_link::{GatewayLink, LinkStatus, ReconnectPhase};
use tracing::info;

use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, WatchEvent};

/// Watch command executor.
pub struct WatchCommand<'a> {
    ctx: &'a Context,
}

impl<'a> WatchCommand<'a> {
    /// Create a new watch command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Connect and print events until `stop` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the link gives up
    /// reconnecting, or output fails.
    pub async fn execute<W, F>(&self, out: &mut W, format: &OutputFormat, stop: F) -> Result<(), CliError>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        self.ctx.link.validate()?;
        let link = GatewayLink::websocket(self.ctx.link.clone());
        Self::run(&link, out, format, stop).await
    }

    /// Connect `link` and print events until `stop` resolves.
    ///
    /// The link is disconnected on return.
    ///
    /// # Errors
    ///
    /// Returns an error if the link gives up reconnecting or output fails.
    pub async fn run<W, F>(link: &GatewayLink, out: &mut W, format: &OutputFormat, stop: F) -> Result<(), CliError>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let (status_sub, mut statuses) = link.status_stream();
        let (message_sub, mut frames) = link.message_stream();
        tokio::pin!(stop);

        info!(endpoint = %link.endpoint(), "watching gateway");
        link.connect(None, None);

        let result = loop {
            tokio::select! {
                biased;
                () = &mut stop => break Ok(()),
                Some(status) = statuses.recv() => {
                    if let Err(e) = format.write_line(out, &WatchEvent::Status { status }) {
                        break Err(e);
                    }
                    if status == LinkStatus::Error && link.reconnect_phase() == ReconnectPhase::GivenUp {
                        break Err(CliError::Connection(format!(
                            "gave up reconnecting to {}",
                            link.endpoint()
                        )));
                    }
                }
                Some(frame) = frames.recv() => {
                    if let Err(e) = format.write_line(out, &WatchEvent::from(&frame)) {
                        break Err(e);
                    }
                }
                else => break Err(CliError::Connection("link stopped".into())),
            }
        };

        link.disconnect();
        status_sub.unsubscribe();
        message_sub.unsubscribe();
        result
    }
}
