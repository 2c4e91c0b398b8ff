//! The gateway link: a handle plus the driver task that owns the connection.
//!
//! Every state transition happens on the driver. The handle only records
//! the connect target and the stop flag, posts a command, and returns.

use std::future::pending;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use raven_proto::InboundFrame;
use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};
use tracing::{debug, error, info, trace, warn};

use crate::config::LinkConfig;
use crate::endpoint::LinkTarget;
use crate::events::{EventSink, TransportEvent};
use crate::observers::{ObserverSet, Subscription};
use crate::payload::Payload;
use crate::reconnect::ReconnectConfig;
use crate::state::{AtomicReconnectPhase, LinkStatus, ReconnectPhase, StatusCell, Transition};
use crate::transport::{Connection, Transport, WsTransport, ABNORMAL_CLOSURE};

/// State visible to every handle.
struct Shared {
    status: StatusCell,
    status_observers: ObserverSet<Transition>,
    message_observers: ObserverSet<InboundFrame>,
    target: RwLock<LinkTarget>,
    stop_requested: AtomicBool,
    attempts: AtomicU32,
    phase: AtomicReconnectPhase,
}

#[derive(Debug)]
enum Command {
    Connect,
    Disconnect,
    Send(String),
}

/// A resilient link to a gateway.
///
/// Cloning is cheap; all clones drive the same connection. The driver task
/// stops once every clone has been dropped.
#[derive(Clone)]
pub struct GatewayLink {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
}

impl GatewayLink {
    /// Create a link over `transport` and spawn its driver.
    ///
    /// The link starts disconnected; call [`connect`](Self::connect).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<T: Transport>(transport: T, config: LinkConfig) -> Self {
        let shared = Arc::new(Shared {
            status: StatusCell::new(LinkStatus::Disconnected),
            status_observers: ObserverSet::new(),
            message_observers: ObserverSet::new(),
            target: RwLock::new(LinkTarget::new(config.endpoint.clone(), config.credential.clone())),
            stop_requested: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
            phase: AtomicReconnectPhase::new(ReconnectPhase::Idle),
        });

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            shared: Arc::clone(&shared),
            transport: Box::new(transport),
            reconnect: config.reconnect.clone(),
            error_close_grace: config.error_close_grace(),
            commands: commands_rx,
            events_tx,
            events: events_rx,
            connection: None,
            generation: 0,
            retry: None,
            grace: None,
        };
        tokio::spawn(driver.run());

        Self {
            shared,
            commands: commands_tx,
        }
    }

    /// Create a link over WebSockets.
    pub fn websocket(config: LinkConfig) -> Self {
        Self::new(WsTransport::new(), config)
    }

    /// Open a fresh connection, replacing any existing one.
    ///
    /// A non-empty `endpoint` and any `credential` become the new defaults;
    /// an empty credential clears the stored one. The retry counter starts
    /// over.
    pub fn connect(&self, endpoint: Option<&str>, credential: Option<&str>) {
        self.shared.target.write().update(endpoint, credential);
        self.shared.stop_requested.store(false, Ordering::SeqCst);
        self.post(Command::Connect);
    }

    /// Close the connection and stop reconnecting.
    ///
    /// No automatic reconnection happens until the next
    /// [`connect`](Self::connect).
    pub fn disconnect(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.post(Command::Disconnect);
    }

    /// Send a payload if the link is connected; otherwise drop it.
    pub fn send_message(&self, payload: impl Into<Payload>) {
        let status = self.status();
        if !status.is_connected() {
            warn!(status = %status, "link not connected, dropping outbound message");
            return;
        }

        match payload.into().encode() {
            Ok(frame) => self.post(Command::Send(frame)),
            Err(e) => warn!(error = %e, "failed to encode outbound message"),
        }
    }

    /// Register a callback for every inbound frame.
    pub fn on_message<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&InboundFrame) + Send + Sync + 'static,
    {
        self.shared.message_observers.subscribe(callback)
    }

    /// Register a callback for status changes.
    ///
    /// The callback is invoked with the current status before this returns.
    /// It never sees an older status after a newer one.
    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(LinkStatus) + Send + Sync + 'static,
    {
        let last_seen: Mutex<Option<u64>> = Mutex::new(None);
        let deliver = Arc::new(move |transition: &Transition| {
            let mut last = last_seen.lock();
            if last.is_some_and(|seen| transition.sequence <= seen) {
                return;
            }
            *last = Some(transition.sequence);
            callback(transition.status);
        });

        let subscription = {
            let deliver = Arc::clone(&deliver);
            self.shared
                .status_observers
                .subscribe(move |transition| deliver(transition))
        };
        deliver(&self.shared.status.snapshot());
        subscription
    }

    /// Stream of status changes, starting with the current status.
    pub fn status_stream(&self) -> (Subscription, mpsc::UnboundedReceiver<LinkStatus>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.on_status_change(move |status| {
            let _ = tx.send(status);
        });
        (subscription, rx)
    }

    /// Stream of inbound frames.
    pub fn message_stream(&self) -> (Subscription, mpsc::UnboundedReceiver<InboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.on_message(move |frame| {
            let _ = tx.send(frame.clone());
        });
        (subscription, rx)
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> LinkStatus {
        self.shared.status.load()
    }

    /// Endpoint used by the next connection.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.shared.target.read().endpoint.clone()
    }

    /// Credential used by the next connection.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.shared.target.read().credential.clone()
    }

    /// Retries made since the last successful open or explicit connect.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    /// Where the retry policy stands.
    #[must_use]
    pub fn reconnect_phase(&self) -> ReconnectPhase {
        self.shared.phase.load()
    }

    fn post(&self, command: Command) {
        if self.commands.send(command).is_err() {
            error!("link driver has stopped");
        }
    }
}

impl std::fmt::Debug for GatewayLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayLink")
            .field("endpoint", &self.endpoint())
            .field("status", &self.status())
            .field("attempts", &self.attempts())
            .field("phase", &self.reconnect_phase())
            .finish_non_exhaustive()
    }
}

struct Driver {
    shared: Arc<Shared>,
    transport: Box<dyn Transport>,
    reconnect: ReconnectConfig,
    error_close_grace: Option<Duration>,
    commands: mpsc::UnboundedReceiver<Command>,
    events_tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    events: mpsc::UnboundedReceiver<(u64, TransportEvent)>,
    connection: Option<Box<dyn Connection>>,
    /// Generation of the current connection; events tagged otherwise are stale.
    generation: u64,
    retry: Option<Pin<Box<Sleep>>>,
    grace: Option<Pin<Box<Sleep>>>,
}

async fn wait(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

impl Driver {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                Some((generation, event)) = self.events.recv() => {
                    self.handle_event(generation, event);
                }

                () = wait(&mut self.retry) => {
                    self.retry = None;
                    self.retry_fired();
                }

                () = wait(&mut self.grace) => {
                    self.grace = None;
                    warn!("no close after transport error, treating connection as lost");
                    self.handle_close(Some(ABNORMAL_CLOSURE), "error without close");
                }
            }
        }

        self.detach();
        debug!("link driver stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => {
                self.set_attempts(0);
                self.retry = None;
                self.grace = None;
                self.shared.phase.store(ReconnectPhase::Idle);
                self.open();
            }
            Command::Disconnect => {
                self.retry = None;
                self.grace = None;
                self.shared.phase.store(ReconnectPhase::Idle);
                self.detach();
                info!("link disconnected by request");
                self.set_status(LinkStatus::Disconnected);
            }
            Command::Send(frame) => self.send(frame),
        }
    }

    fn handle_event(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.generation || self.connection.is_none() {
            trace!(generation, current = self.generation, "ignoring event from detached connection");
            return;
        }

        match event {
            TransportEvent::Open => {
                self.grace = None;
                self.set_attempts(0);
                self.shared.phase.store(ReconnectPhase::Idle);
                info!(endpoint = %self.shared.target.read().endpoint, "link connected");
                self.set_status(LinkStatus::Connected);

                let identify = self.shared.target.read().identify_message();
                if let Some(identify) = identify {
                    match identify.to_json() {
                        Ok(frame) => self.send(frame),
                        Err(e) => warn!(error = %e, "failed to encode identify message"),
                    }
                }
            }
            TransportEvent::Frame(text) => {
                let frame = InboundFrame::decode(&text);
                if frame.is_raw() {
                    debug!(len = text.len(), "inbound frame is not JSON, delivering as text");
                }
                self.shared.message_observers.notify(&frame);
            }
            TransportEvent::Error(message) => {
                warn!(error = %message, "transport error");
                if self.grace.is_none() {
                    self.grace = self.error_close_grace.map(|grace| Box::pin(sleep(grace)));
                }
            }
            TransportEvent::Closed { code, reason } => self.handle_close(code, &reason),
        }
    }

    fn handle_close(&mut self, code: Option<u16>, reason: &str) {
        self.detach();
        self.grace = None;

        if self.stopping() {
            info!(?code, reason, "link closed");
            self.set_status(LinkStatus::Disconnected);
            return;
        }

        warn!(?code, reason, "link closed unexpectedly");
        self.set_status(LinkStatus::Disconnected);
        self.schedule_reconnect();
    }

    fn retry_fired(&mut self) {
        if self.stopping() {
            self.shared.phase.store(ReconnectPhase::Idle);
            return;
        }

        let attempt = self.attempts() + 1;
        self.set_attempts(attempt);
        self.shared.phase.store(ReconnectPhase::Attempting);
        debug!(attempt, "retry timer fired");
        self.open();
    }

    /// Tear down the current connection and start a new one.
    fn open(&mut self) {
        self.detach();
        self.set_status(LinkStatus::Connecting);

        let (endpoint, url) = {
            let target = self.shared.target.read();
            (target.endpoint.clone(), target.connection_url())
        };

        self.generation += 1;
        let sink = EventSink::new(self.generation, self.events_tx.clone());
        match self.transport.open(&url, sink) {
            Ok(connection) => {
                debug!(endpoint = %endpoint, generation = self.generation, "opening connection");
                self.connection = Some(connection);
            }
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "failed to construct transport");
                self.set_status(LinkStatus::Error);
                if !self.stopping() {
                    self.schedule_reconnect();
                }
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        let attempts = self.attempts();
        if !self.reconnect.should_reconnect(attempts) {
            warn!(
                attempts,
                "max reconnect attempts reached, manual connect required"
            );
            self.retry = None;
            self.shared.phase.store(ReconnectPhase::GivenUp);
            self.set_status(LinkStatus::Error);
            return;
        }

        let delay = self.reconnect.next_delay(attempts);
        info!(
            delay_ms = delay.as_millis() as u64,
            attempt = attempts + 1,
            max_attempts = self.reconnect.max_attempts,
            "reconnecting"
        );
        self.retry = Some(Box::pin(sleep(delay)));
        self.shared.phase.store(ReconnectPhase::Scheduled);
    }

    fn send(&mut self, frame: String) {
        match self.connection.as_mut() {
            Some(connection) if connection.is_open() => {
                if let Err(e) = connection.send(frame) {
                    warn!(error = %e, "failed to send frame");
                }
            }
            _ => warn!("link not open, dropping outbound message"),
        }
    }

    /// Drop the current connection without waiting for its close.
    fn detach(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        self.generation += 1;
    }

    fn set_status(&self, status: LinkStatus) {
        let transition = self.shared.status.advance(status);
        debug!(status = %status, sequence = transition.sequence, "link status changed");
        self.shared.status_observers.notify(&transition);
    }

    fn set_attempts(&self, attempts: u32) {
        self.shared.attempts.store(attempts, Ordering::SeqCst);
    }

    fn attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    fn stopping(&self) -> bool {
        self.shared.stop_requested.load(Ordering::SeqCst)
    }
}
