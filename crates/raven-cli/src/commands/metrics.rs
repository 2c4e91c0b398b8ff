//! Metrics command implementation.
//!
//! Asks the gateway for a usage sample and prints it with derived totals.

use std::io::Write;

use raven_proto::{GatewayMessage, InboundFrame, OutboundMessage, UsageSample};

use crate::client::GatewayClient;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, UsageReport};

/// Metrics command executor.
pub struct MetricsCommand<'a> {
    ctx: &'a Context,
}

impl<'a> MetricsCommand<'a> {
    /// Create a new metrics command.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Connect, fetch a usage sample, and print it.
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

    /// Fetch and print a usage sample over an established client.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway does not answer or output fails.
    pub async fn run<W: Write>(
        client: &mut GatewayClient,
        out: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let sample = client.request(OutboundMessage::GetMetrics, usage).await?;
        format.write(out, &UsageReport::from(sample))
    }
}

fn usage(frame: &InboundFrame) -> Option<UsageSample> {
    match GatewayMessage::from_frame(frame)? {
        GatewayMessage::Usage { sample } => Some(sample),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_metrics_and_usage_frames() {
        let metrics = InboundFrame::decode(r#"{"type":"metrics","inputTokens":150,"outputTokens":200}"#);
        let sample = usage(&metrics).expect("metrics");
        assert_eq!(sample.input_tokens, Some(150));
        assert_eq!(sample.output_tokens, Some(200));

        let short = InboundFrame::decode(r#"{"type":"usage","input":1,"output":2,"rpm":22}"#);
        let sample = usage(&short).expect("usage");
        assert_eq!(sample.total_tokens(), 3);
        assert_eq!(sample.rpm, Some(22.0));

        assert!(usage(&InboundFrame::decode(r#"{"type":"sessions_update","sessions":[]}"#)).is_none());
    }
}
