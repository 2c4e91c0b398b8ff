//! Request/response helpers on top of a [`GatewayLink`].
//!
//! The link itself is fire-and-forget; commands that expect an answer send
//! a message and then watch the inbound stream for the first frame that
//! matches.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use raven_cli::client::GatewayClient;
//! use raven_link::LinkConfig;
//! use raven_proto::{GatewayMessage, OutboundMessage};
//!
//! # async fn example() -> Result<(), raven_cli::CliError> {
//! let mut client = GatewayClient::connect(LinkConfig::default(), Duration::from_secs(10)).await?;
//! let sessions = client
//!     .request(OutboundMessage::GetSessions, |frame| match GatewayMessage::from_frame(frame) {
//!         Some(GatewayMessage::SessionsUpdate { sessions }) => Some(sessions),
//!         _ => None,
//!     })
//!     .await?;
//! println!("{} sessions", sessions.len());
//! client.close().await;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use raven_link::{GatewayLink, LinkConfig, LinkStatus, Payload, Subscription};
use raven_proto::InboundFrame;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, trace};

use crate::error::CliError;

/// Time given to the socket to flush queued frames before closing.
const CLOSE_LINGER: Duration = Duration::from_millis(100);

/// A connected gateway link with buffered status and message streams.
pub struct GatewayClient {
    link: GatewayLink,
    statuses: mpsc::UnboundedReceiver<LinkStatus>,
    frames: mpsc::UnboundedReceiver<InboundFrame>,
    subscriptions: Vec<Subscription>,
    request_timeout: Duration,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("link", &self.link)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Connect over WebSockets and wait until the link is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the link reports an error status or does not
    /// connect within `wait`.
    pub async fn connect(config: LinkConfig, wait: Duration) -> Result<Self, CliError> {
        config.validate()?;
        Self::attach(GatewayLink::websocket(config), wait).await
    }

    /// Connect an existing link and wait until it is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the link reports an error status or does not
    /// connect within `wait`.
    pub async fn attach(link: GatewayLink, wait: Duration) -> Result<Self, CliError> {
        let (status_sub, statuses) = link.status_stream();
        let (message_sub, frames) = link.message_stream();
        let mut client = Self {
            link,
            statuses,
            frames,
            subscriptions: vec![status_sub, message_sub],
            request_timeout: wait,
        };

        debug!(endpoint = %client.link.endpoint(), "connecting to gateway");
        client.link.connect(None, None);

        match timeout(wait, client.wait_connected()).await {
            Ok(Ok(())) => Ok(client),
            Ok(Err(e)) => {
                client.link.disconnect();
                Err(e)
            }
            Err(_) => {
                client.link.disconnect();
                Err(CliError::Timeout(format!(
                    "gateway {} did not connect within {}s",
                    client.link.endpoint(),
                    wait.as_secs()
                )))
            }
        }
    }

    async fn wait_connected(&mut self) -> Result<(), CliError> {
        let mut connecting = false;
        while let Some(status) = self.statuses.recv().await {
            trace!(status = %status, "link status");
            match status {
                LinkStatus::Connected => return Ok(()),
                LinkStatus::Connecting => connecting = true,
                LinkStatus::Error if connecting => {
                    return Err(CliError::Connection(format!(
                        "cannot reach gateway {}",
                        self.link.endpoint()
                    )));
                }
                LinkStatus::Disconnected | LinkStatus::Error => {}
            }
        }
        Err(CliError::Connection("link stopped".into()))
    }

    /// The underlying link.
    #[must_use]
    pub const fn link(&self) -> &GatewayLink {
        &self.link
    }

    /// Send a payload.
    pub fn send(&self, payload: impl Into<Payload>) {
        self.link.send_message(payload);
    }

    /// Receive the next inbound frame with no deadline.
    ///
    /// Returns `None` once the link has stopped.
    pub async fn recv(&mut self) -> Option<InboundFrame> {
        self.frames.recv().await
    }

    /// Wait for the next inbound frame.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing arrives within the request timeout.
    pub async fn next_frame(&mut self) -> Result<InboundFrame, CliError> {
        timeout(self.request_timeout, self.frames.recv())
            .await
            .map_err(|_| {
                CliError::Timeout(format!(
                    "no message within {}s",
                    self.request_timeout.as_secs()
                ))
            })?
            .ok_or_else(|| CliError::Connection("message stream closed".into()))
    }

    /// Send `payload` and return the first inbound frame `pick` accepts.
    ///
    /// Frames `pick` rejects are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no accepted frame arrives within the request
    /// timeout.
    pub async fn request<T>(
        &mut self,
        payload: impl Into<Payload>,
        mut pick: impl FnMut(&InboundFrame) -> Option<T>,
    ) -> Result<T, CliError> {
        self.send(payload);

        let deadline = Instant::now() + self.request_timeout;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.frames.recv())
                .await
                .map_err(|_| {
                    CliError::Timeout(format!(
                        "no matching reply within {}s",
                        self.request_timeout.as_secs()
                    ))
                })?
                .ok_or_else(|| CliError::Connection("message stream closed".into()))?;

            if let Some(value) = pick(&frame) {
                return Ok(value);
            }
            trace!(frame = %frame, "skipping unrelated frame");
        }
    }

    /// Disconnect, giving queued frames a moment to reach the socket.
    pub async fn close(self) {
        self.link.disconnect();
        tokio::time::sleep(CLOSE_LINGER).await;
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
