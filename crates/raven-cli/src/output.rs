//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use raven_link::LinkStatus;
use raven_proto::{InboundFrame, Session, UsageSample};
use serde::Serialize;
use serde_json::Value;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write one item of a stream: a single JSON line, or its table form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_line<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Sessions reported by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct SessionList {
    /// Sessions.
    pub sessions: Vec<Session>,
}

impl TableDisplay for SessionList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.sessions.is_empty() {
            writeln!(writer, "No active sessions")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<24}  {:<20}  {:<10}  {:<16}  {}",
            "ID", "NAME", "STATUS", "DEVICE", "LAST ACTIVE"
        )?;
        writeln!(writer, "{}", "─".repeat(86))?;

        for session in &self.sessions {
            writeln!(
                writer,
                "{:<24}  {:<20}  {:<10}  {:<16}  {}",
                truncate(&session.id, 24),
                truncate(&session.name, 20),
                session.status,
                truncate(&session.device, 16),
                session.last_active
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} session(s)", self.sessions.len())?;
        Ok(())
    }
}

/// A usage sample with derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    /// Raw sample.
    #[serde(flatten)]
    pub sample: UsageSample,
    /// Input plus output tokens.
    pub total_tokens: u64,
    /// Rough cost in USD.
    pub estimated_cost_usd: f64,
}

impl From<UsageSample> for UsageReport {
    fn from(sample: UsageSample) -> Self {
        Self {
            total_tokens: sample.total_tokens(),
            estimated_cost_usd: sample.estimated_cost_usd(),
            sample,
        }
    }
}

impl TableDisplay for UsageReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

        writeln!(writer, "Gateway Usage")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Tokens")?;
        writeln!(
            writer,
            "  Input:          {}",
            or_dash(self.sample.input_tokens.map(|v| v.to_string()))
        )?;
        writeln!(
            writer,
            "  Output:         {}",
            or_dash(self.sample.output_tokens.map(|v| v.to_string()))
        )?;
        writeln!(writer, "  Total:          {}", self.total_tokens)?;
        writeln!(writer)?;
        writeln!(writer, "Performance")?;
        writeln!(
            writer,
            "  Latency:        {}",
            or_dash(self.sample.latency_ms.map(|v| format!("{v:.0} ms")))
        )?;
        writeln!(
            writer,
            "  Requests/min:   {}",
            or_dash(self.sample.rpm.map(|v| format!("{v:.1}")))
        )?;
        writeln!(writer)?;
        writeln!(writer, "Est. Cost:        ${:.6}", self.estimated_cost_usd)?;
        Ok(())
    }
}

/// Saved settings as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    /// Settings file path.
    pub path: String,
    /// Saved gateway URL.
    pub gateway_url: Option<String>,
    /// Whether a credential is saved. The credential itself is never shown.
    pub has_token: bool,
}

impl TableDisplay for SettingsView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Settings:  {}", self.path)?;
        writeln!(
            writer,
            "Gateway:   {}",
            self.gateway_url.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            writer,
            "Token:     {}",
            if self.has_token { "********" } else { "(not set)" }
        )?;
        Ok(())
    }
}

/// Acknowledgement of a fire-and-forget command.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    /// What was done.
    pub action: String,
    /// What it was done to, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl TableDisplay for Ack {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match &self.target {
            Some(target) => writeln!(writer, "{}: {target}", self.action)?,
            None => writeln!(writer, "{}", self.action)?,
        }
        Ok(())
    }
}

/// One line of `watch` output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// The link status changed.
    Status {
        /// New status.
        status: LinkStatus,
    },
    /// A frame arrived.
    Message {
        /// Frame as delivered to observers.
        data: Value,
    },
}

impl From<&InboundFrame> for WatchEvent {
    fn from(frame: &InboundFrame) -> Self {
        Self::Message {
            data: frame.to_value(),
        }
    }
}

impl TableDisplay for WatchEvent {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match self {
            Self::Status { status } => writeln!(writer, "-- {status}")?,
            Self::Message { data } => writeln!(writer, "<- {data}")?,
        }
        Ok(())
    }
}

/// A chat reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatLine {
    /// Speaker role, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Reply text, or the raw frame when it carries no text.
    pub content: String,
}

impl From<&InboundFrame> for ChatLine {
    fn from(frame: &InboundFrame) -> Self {
        Self {
            role: frame
                .field("role")
                .and_then(Value::as_str)
                .map(str::to_owned),
            content: frame
                .text()
                .map_or_else(|| frame.to_string(), str::to_owned),
        }
    }
}

impl TableDisplay for ChatLine {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "{}> {}",
            self.role.as_deref().unwrap_or("moltbot"),
            self.content
        )?;
        Ok(())
    }
}

/// Truncate a string to `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
