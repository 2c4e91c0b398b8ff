//! Scripted in-memory transport for driving the link in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::LinkError;
use crate::events::{EventSink, TransportEvent};
use crate::transport::{Connection, Transport, ABNORMAL_CLOSURE};

/// How the fake answers an open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Nothing happens until the test drives the connection.
    Manual,
    /// Every open is refused: an error followed by an abnormal close.
    Refuse,
    /// Every open succeeds immediately.
    Accept,
    /// Construction itself fails.
    Reject,
}

#[derive(Debug, Default)]
struct ConnState {
    open: bool,
    closed_by_link: bool,
    sent: Vec<String>,
}

#[derive(Debug)]
struct Opened {
    url: String,
    sink: EventSink,
    state: Arc<Mutex<ConnState>>,
}

#[derive(Debug)]
struct Inner {
    mode: Mode,
    opened: Vec<Opened>,
    live_at_open: Vec<usize>,
}

/// Transport whose connections are driven by the test.
#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    inner: Arc<Mutex<Inner>>,
    live: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                mode,
                opened: Vec::new(),
                live_at_open: Vec::new(),
            })),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn set_mode(&self, mode: Mode) {
        self.inner.lock().mode = mode;
    }

    /// Number of open calls, including rejected ones.
    pub(crate) fn open_count(&self) -> usize {
        self.inner.lock().opened.len()
    }

    pub(crate) fn url(&self, index: usize) -> String {
        self.with_opened(index, |opened| opened.url.clone())
    }

    /// Frames sent over connection `index`.
    pub(crate) fn sent(&self, index: usize) -> Vec<String> {
        self.with_opened(index, |opened| opened.state.lock().sent.clone())
    }

    /// Whether the link closed connection `index` itself.
    pub(crate) fn closed_by_link(&self, index: usize) -> bool {
        self.with_opened(index, |opened| opened.state.lock().closed_by_link)
    }

    /// Largest number of connection handles alive when an open began.
    pub(crate) fn max_live_at_open(&self) -> usize {
        self.inner.lock().live_at_open.iter().copied().max().unwrap_or(0)
    }

    /// Connections only exist once the driver has processed the connect
    /// command, so tests must let it run before driving one.
    fn with_opened<R>(&self, index: usize, f: impl FnOnce(&Opened) -> R) -> R {
        let inner = self.inner.lock();
        let Some(opened) = inner.opened.get(index) else {
            panic!(
                "connection {index} not opened yet ({} opened so far)",
                inner.opened.len()
            );
        };
        f(opened)
    }

    fn with_sink(&self, index: usize, f: impl FnOnce(&EventSink, &Mutex<ConnState>)) {
        self.with_opened(index, |opened| f(&opened.sink, &opened.state));
    }

    /// Complete the handshake of connection `index`.
    pub(crate) fn accept(&self, index: usize) {
        self.with_sink(index, |sink, state| {
            state.lock().open = true;
            sink.emit(TransportEvent::Open);
        });
    }

    /// Deliver an inbound text frame on connection `index`.
    pub(crate) fn frame(&self, index: usize, text: &str) {
        self.with_sink(index, |sink, _| {
            sink.emit(TransportEvent::Frame(text.to_string()));
        });
    }

    /// Report a transport error on connection `index` without closing it.
    pub(crate) fn error(&self, index: usize, message: &str) {
        self.with_sink(index, |sink, _| {
            sink.emit(TransportEvent::Error(message.to_string()));
        });
    }

    /// Close connection `index` from the remote side.
    pub(crate) fn drop_remote(&self, index: usize, code: u16) {
        self.with_sink(index, |sink, state| {
            state.lock().open = false;
            sink.closed(Some(code), "remote closed");
        });
    }
}

impl Transport for FakeTransport {
    fn open(&self, url: &str, sink: EventSink) -> Result<Box<dyn Connection>, LinkError> {
        let mut inner = self.inner.lock();
        inner.live_at_open.push(self.live.load(Ordering::SeqCst));

        let state = Arc::new(Mutex::new(ConnState::default()));
        inner.opened.push(Opened {
            url: url.to_string(),
            sink: sink.clone(),
            state: Arc::clone(&state),
        });

        match inner.mode {
            Mode::Manual => {}
            Mode::Refuse => {
                sink.emit(TransportEvent::Error("connection refused".to_string()));
                sink.closed(Some(ABNORMAL_CLOSURE), "connection refused");
            }
            Mode::Accept => {
                state.lock().open = true;
                sink.emit(TransportEvent::Open);
            }
            Mode::Reject => {
                return Err(LinkError::InvalidEndpoint {
                    endpoint: url.to_string(),
                    reason: "rejected by test".to_string(),
                });
            }
        }

        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            state,
            live: Arc::clone(&self.live),
        }))
    }
}

struct FakeConnection {
    state: Arc<Mutex<ConnState>>,
    live: Arc<AtomicUsize>,
}

impl Connection for FakeConnection {
    fn send(&mut self, frame: String) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        if !state.open || state.closed_by_link {
            return Err(LinkError::NotConnected);
        }
        state.sent.push(frame);
        Ok(())
    }

    fn is_open(&self) -> bool {
        let state = self.state.lock();
        state.open && !state.closed_by_link
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.closed_by_link = true;
        state.open = false;
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    #[should_panic(expected = "connection 0 not opened yet (0 opened so far)")]
    fn driving_an_unopened_connection_names_it() {
        FakeTransport::new(Mode::Manual).accept(0);
    }

    #[test]
    fn accept_reaches_the_opened_sink() {
        let transport = FakeTransport::new(Mode::Manual);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _conn = transport
            .open("ws://fake", EventSink::new(1, tx))
            .expect("open");

        transport.accept(0);

        let (generation, event) = rx.try_recv().expect("event");
        assert_eq!(generation, 1);
        assert!(matches!(event, TransportEvent::Open));
        assert_eq!(transport.url(0), "ws://fake");
    }
}
