//! Transport abstraction and the WebSocket implementation.
//!
//! A [`Transport`] opens one [`Connection`] per call and reports its
//! lifecycle through the supplied [`EventSink`]. Opening never blocks: the
//! handshake runs in the background and its outcome arrives as an event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};
use url::Url;

use crate::error::LinkError;
use crate::events::{EventSink, TransportEvent};

/// Close code reported when a connection drops without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Opens connections to a gateway.
pub trait Transport: Send + Sync + 'static {
    /// Start opening a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot even be constructed, for
    /// example because the URL is malformed. Failures after construction
    /// are reported through `sink`.
    fn open(&self, url: &str, sink: EventSink) -> Result<Box<dyn Connection>, LinkError>;
}

/// One live transport connection.
pub trait Connection: Send {
    /// Queue a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotConnected`] if the connection is not open.
    fn send(&mut self, frame: String) -> Result<(), LinkError>;

    /// Whether the connection is open.
    fn is_open(&self) -> bool;

    /// Start closing the connection without waiting for acknowledgement.
    fn close(&mut self);
}

/// WebSocket transport on `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl WsTransport {
    /// Create a WebSocket transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for WsTransport {
    fn open(&self, url: &str, sink: EventSink) -> Result<Box<dyn Connection>, LinkError> {
        let parsed = Url::parse(url).map_err(|e| LinkError::InvalidEndpoint {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(LinkError::InvalidEndpoint {
                endpoint: url.to_string(),
                reason: format!("unsupported scheme '{}', expected ws or wss", parsed.scheme()),
            });
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| LinkError::Transport(format!("no async runtime: {e}")))?;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let task = runtime.spawn(run_socket(
            parsed.to_string(),
            sink,
            out_rx,
            Arc::clone(&open),
        ));

        Ok(Box::new(WsConnection {
            out_tx: Some(out_tx),
            open,
            task,
        }))
    }
}

/// Handle to a socket task spawned by [`WsTransport`].
#[derive(Debug)]
struct WsConnection {
    out_tx: Option<mpsc::UnboundedSender<Message>>,
    open: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Connection for WsConnection {
    fn send(&mut self, frame: String) -> Result<(), LinkError> {
        if !self.is_open() {
            return Err(LinkError::NotConnected);
        }
        let tx = self.out_tx.as_ref().ok_or(LinkError::NotConnected)?;
        tx.send(Message::Text(frame.into()))
            .map_err(|_| LinkError::NotConnected)
    }

    fn is_open(&self) -> bool {
        self.out_tx.is_some() && self.open.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        // Dropping the queue tells an open socket to send a close frame.
        // A socket still handshaking has nobody to say goodbye to.
        if self.out_tx.take().is_some() && !self.open.load(Ordering::SeqCst) {
            self.task.abort();
        }
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    url: String,
    sink: EventSink,
    mut out_rx: mpsc::UnboundedReceiver<Message>,
    open: Arc<AtomicBool>,
) {
    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            sink.emit(TransportEvent::Error(e.to_string()));
            sink.closed(Some(ABNORMAL_CLOSURE), e.to_string());
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    sink.emit(TransportEvent::Open);

    let (mut write, mut read) = ws_stream.split();

    let (code, reason) = loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    sink.emit(TransportEvent::Frame(text.to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    sink.emit(TransportEvent::Frame(String::from_utf8_lossy(&data).into_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map_or((None, String::new()), |f| {
                        (Some(u16::from(f.code)), f.reason.to_string())
                    });
                }
                Some(Ok(_)) => {
                    trace!("ignoring control frame");
                }
                Some(Err(e)) => {
                    sink.emit(TransportEvent::Error(e.to_string()));
                    break (Some(ABNORMAL_CLOSURE), e.to_string());
                }
                None => break (Some(ABNORMAL_CLOSURE), "connection closed".to_string()),
            },

            out = out_rx.recv() => match out {
                Some(message) => {
                    if let Err(e) = write.send(message).await {
                        sink.emit(TransportEvent::Error(e.to_string()));
                        break (Some(ABNORMAL_CLOSURE), format!("write failed: {e}"));
                    }
                }
                None => {
                    // Torn down by the link; nobody is listening for the close.
                    debug!(url = %url, "closing detached socket");
                    let _ = write.send(Message::Close(None)).await;
                    let _ = write.close().await;
                    open.store(false, Ordering::SeqCst);
                    return;
                }
            },
        }
    };

    open.store(false, Ordering::SeqCst);
    sink.closed(code, reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> (EventSink, mpsc::UnboundedReceiver<(u64, TransportEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink::new(1, tx), rx)
    }

    #[tokio::test]
    async fn test_rejects_unparseable_url() {
        let (sink, _rx) = sink();
        let err = WsTransport::new().open("not a url", sink).err();
        assert!(matches!(err, Some(LinkError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn test_rejects_non_websocket_scheme() {
        let (sink, _rx) = sink();
        let err = WsTransport::new().open("http://127.0.0.1:1", sink).err();
        match err {
            Some(LinkError::InvalidEndpoint { reason, .. }) => assert!(reason.contains("http")),
            other => panic!("expected InvalidEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_requires_runtime() {
        let (sink, _rx) = sink();
        let err = WsTransport::new().open("ws://127.0.0.1:1", sink).err();
        assert!(matches!(err, Some(LinkError::Transport(_))));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_close() {
        // Bind and drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let (sink, mut rx) = sink();
        let mut conn = WsTransport::new()
            .open(&format!("ws://{addr}"), sink)
            .expect("construct");
        assert!(!conn.is_open());
        assert!(matches!(
            conn.send("early".to_string()),
            Err(LinkError::NotConnected)
        ));

        let (generation, first) = rx.recv().await.expect("error event");
        assert_eq!(generation, 1);
        assert!(matches!(first, TransportEvent::Error(_)));

        let (_, second) = rx.recv().await.expect("close event");
        assert!(matches!(
            second,
            TransportEvent::Closed {
                code: Some(ABNORMAL_CLOSURE),
                ..
            }
        ));
    }
}
