//! Transport lifecycle events.

use tokio::sync::mpsc;

/// Lifecycle events reported by a transport connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open.
    Open,
    /// A text frame arrived.
    Frame(String),
    /// The transport reported an error. A close normally follows.
    Error(String),
    /// The connection closed.
    Closed {
        /// Close code, if one was received.
        code: Option<u16>,
        /// Close reason; empty when none was given.
        reason: String,
    },
}

/// Where a connection reports its events.
///
/// Every event is tagged with the generation of the connection it belongs
/// to, so the link can ignore events from connections it has already torn
/// down.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
}

impl EventSink {
    pub(crate) const fn new(
        generation: u64,
        tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    ) -> Self {
        Self { generation, tx }
    }

    /// Generation of the connection this sink belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event. Returns `false` once the link has shut down.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send((self.generation, event)).is_ok()
    }

    /// Report a close.
    pub fn closed(&self, code: Option<u16>, reason: impl Into<String>) -> bool {
        self.emit(TransportEvent::Closed {
            code,
            reason: reason.into(),
        })
    }
}
