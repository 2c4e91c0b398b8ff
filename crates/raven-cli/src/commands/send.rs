//! Raw payload command implementation.

use std::io::Write;

use raven_link::Payload;
use serde_json::Value;

use crate::client::GatewayClient;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Ack, OutputFormat, WatchEvent};

/// Send command executor.
pub struct SendCommand<'a> {
    ctx: &'a Context,
}

impl<'a> SendCommand<'a> {
    /// Create a new send command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Send `raw` once connected, optionally printing the first reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable, or if `wait` is set
    /// and nothing arrives in time.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        raw: &str,
        wait: bool,
    ) -> Result<(), CliError> {
        let mut client = GatewayClient::connect(self.ctx.link.clone(), self.ctx.timeout).await?;
        let result = Self::run(&mut client, out, format, raw, wait).await;
        client.close().await;
        result
    }

    /// Send over an established client.
    ///
    /// # Errors
    ///
    /// Returns an error if `wait` is set and nothing arrives in time.
    pub async fn run<W: Write>(
        client: &mut GatewayClient,
        out: &mut W,
        format: &OutputFormat,
        raw: &str,
        wait: bool,
    ) -> Result<(), CliError> {
        client.send(parse_payload(raw));

        if wait {
            let reply = client.next_frame().await?;
            return format.write(out, &WatchEvent::from(&reply));
        }

        format.write(
            out,
            &Ack {
                action: "Sent".into(),
                target: None,
            },
        )
    }
}

/// JSON is sent re-encoded; anything else goes out verbatim.
#[must_use]
pub fn parse_payload(raw: &str) -> Payload {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Text(raw.to_string()),
    }
}
