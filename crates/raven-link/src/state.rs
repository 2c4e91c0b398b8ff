//! Link status types.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Status of the gateway link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    /// No transport, or the last one closed.
    Disconnected,
    /// A transport is being opened.
    Connecting,
    /// The transport is open.
    Connected,
    /// Construction failed or retries are exhausted.
    Error,
}

impl LinkStatus {
    const fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Error,
        }
    }

    /// Whether frames can be sent.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Connected => write!(f, "CONNECTED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A status change together with its position in the transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Strictly increasing per link; 0 is the initial status.
    pub sequence: u64,
    /// Status after the transition.
    pub status: LinkStatus,
}

/// Atomic status cell that also counts transitions.
///
/// The low byte holds the status, the remaining bits the sequence.
#[derive(Debug)]
pub(crate) struct StatusCell(AtomicU64);

impl StatusCell {
    pub(crate) const fn new(status: LinkStatus) -> Self {
        Self(AtomicU64::new(status as u64))
    }

    pub(crate) fn load(&self) -> LinkStatus {
        self.snapshot().status
    }

    pub(crate) fn snapshot(&self) -> Transition {
        Self::unpack(self.0.load(Ordering::SeqCst))
    }

    /// Record a transition and return it.
    pub(crate) fn advance(&self, status: LinkStatus) -> Transition {
        let next = |packed: u64| (((packed >> 8) + 1) << 8) | status as u64;
        let prev = match self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |packed| Some(next(packed)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        Self::unpack(next(prev))
    }

    const fn unpack(packed: u64) -> Transition {
        Transition {
            sequence: packed >> 8,
            status: LinkStatus::from_bits((packed & 0xff) as u8),
        }
    }
}

/// Where the reconnection policy currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconnectPhase {
    /// No retry pending.
    Idle,
    /// A retry timer is pending.
    Scheduled,
    /// A retry fired and its transport is being opened.
    Attempting,
    /// Attempts are exhausted; a manual connect is required.
    GivenUp,
}

/// Atomic wrapper for [`ReconnectPhase`].
#[derive(Debug)]
pub(crate) struct AtomicReconnectPhase(AtomicU8);

impl AtomicReconnectPhase {
    pub(crate) const fn new(phase: ReconnectPhase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    pub(crate) fn load(&self) -> ReconnectPhase {
        match self.0.load(Ordering::SeqCst) {
            0 => ReconnectPhase::Idle,
            1 => ReconnectPhase::Scheduled,
            2 => ReconnectPhase::Attempting,
            _ => ReconnectPhase::GivenUp,
        }
    }

    pub(crate) fn store(&self, phase: ReconnectPhase) {
        self.0.store(phase as u8, Ordering::SeqCst);
    }
}
