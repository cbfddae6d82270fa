//! STOMP protocol client over a reconnecting transport.
//!
//! [`StompClient`] is a thin handle. `connect()` spawns a connection task that
//! owns the transport and handles:
//! - the CONNECT / CONNECTED handshake
//! - heart-beats in both directions
//! - routing MESSAGE frames to the handler registered for their channel
//! - reconnection with a fixed delay after the connection drops
//!
//! Publish and subscribe calls are checked against the connection state on
//! the caller's side and queued to the task over an unbounded channel.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use agora_shared::stomp::{
    Command, Frame, HEARTBEAT, HeartBeat, NegotiatedHeartBeat, STOMP_VERSION, WireMessage,
    decode_message,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior, interval_at, sleep, timeout},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ClientConfig,
    domain::{ClientEvent, EventHandler, FrameHandler, InboundFrame, ProtocolClient, ProtocolError},
    infrastructure::transport::{Connector, Endpoint, Transport, TransportError},
};

/// Silence tolerated on the inbound side, as a multiple of the agreed period.
const HEARTBEAT_GRACE_FACTOR: u32 = 2;

/// Receipt id attached to our DISCONNECT frame.
const DISCONNECT_RECEIPT: &str = "disconnect";

// ============================================================================
// Shared state
// ============================================================================

/// Work queued from the handle to the connection task.
enum Outgoing {
    Frame(Frame),
    Disconnect,
}

struct Subscription {
    id: String,
    handler: FrameHandler,
}

#[derive(Default)]
struct Handlers {
    on_event: Option<EventHandler>,
    /// Keyed by destination.
    subscriptions: HashMap<String, Subscription>,
    next_subscription_id: u64,
}

/// State shared by one handle and one connection task.
///
/// Every change of `connected` happens while `handlers` is locked, so a
/// caller holding the lock sees a consistent pair.
#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    handlers: Mutex<Handlers>,
}

impl Shared {
    fn handlers(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn emit(&self, event: ClientEvent) {
        let handlers = self.handlers();
        match &handlers.on_event {
            Some(on_event) => on_event(event),
            None => tracing::debug!("Client detached, dropping event {:?}", event),
        }
    }

    /// Flip to connected for a fresh STOMP session.
    ///
    /// Frames queued for a previous connection are discarded. Returns
    /// `false` when the handle has been disconnected in the meantime.
    fn mark_connected(&self, commands: &mut mpsc::UnboundedReceiver<Outgoing>) -> bool {
        let mut handlers = self.handlers();
        if handlers.on_event.is_none() {
            return false;
        }
        handlers.subscriptions.clear();
        while commands.try_recv().is_ok() {}
        self.connected.store(true, Ordering::Release);
        true
    }

    /// Subscriptions do not outlive the connection they were made on.
    fn mark_lost(&self) {
        let mut handlers = self.handlers();
        self.connected.store(false, Ordering::Release);
        handlers.subscriptions.clear();
    }

    fn dispatch(&self, frame: &Frame) {
        let destination = frame.header("destination").unwrap_or_default();
        let handlers = self.handlers();
        let subscription = handlers.subscriptions.get(destination).or_else(|| {
            let id = frame.header("subscription")?;
            handlers.subscriptions.values().find(|s| s.id == id)
        });

        match subscription {
            Some(subscription) => (subscription.handler)(InboundFrame {
                destination: destination.to_string(),
                body: frame.body.clone(),
            }),
            None => tracing::debug!("No handler for MESSAGE frame to '{}'", destination),
        }
    }
}

// ============================================================================
// Client handle
// ============================================================================

struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Outgoing>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// STOMP client implementing [`ProtocolClient`].
///
/// # Example
///
/// ```rust,ignore
/// use agora_client::config::ClientConfig;
/// use agora_client::domain::ProtocolClient;
/// use agora_client::infrastructure::{Endpoint, StompClient, WebSocketConnector};
///
/// let config = ClientConfig::default();
/// let endpoint = Endpoint::parse(&config.endpoint)?;
/// let mut client = StompClient::new(WebSocketConnector, endpoint, config);
/// client.connect(Box::new(|event| println!("{event:?}")))?;
/// ```
pub struct StompClient<C: Connector> {
    connector: Arc<C>,
    endpoint: Endpoint,
    config: ClientConfig,
    shared: Arc<Shared>,
    connection: Option<ConnectionHandle>,
}

impl<C: Connector> StompClient<C> {
    #[must_use]
    pub fn new(connector: C, endpoint: Endpoint, config: ClientConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            endpoint,
            config,
            shared: Arc::new(Shared::default()),
            connection: None,
        }
    }

    fn queue(&self, frame: Frame) -> Result<(), ProtocolError> {
        let connection = self.connection.as_ref().ok_or(ProtocolError::NotConnected)?;
        connection
            .commands
            .send(Outgoing::Frame(frame))
            .map_err(|_| ProtocolError::NotConnected)
    }
}

impl<C: Connector> ProtocolClient for StompClient<C> {
    fn connect(&mut self, on_event: EventHandler) -> Result<(), ProtocolError> {
        if self
            .connection
            .as_ref()
            .is_some_and(|connection| !connection.task.is_finished())
        {
            return Err(ProtocolError::AlreadyActive);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ProtocolError::Runtime(e.to_string()))?;

        // A fresh state per connection keeps a winding-down task from an
        // earlier connect() away from the new handlers.
        let shared = Arc::new(Shared::default());
        shared.handlers().on_event = Some(on_event);
        self.shared = Arc::clone(&shared);

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = ConnectionTask {
            connector: Arc::clone(&self.connector),
            endpoint: self.endpoint.clone(),
            config: self.config.clone(),
            shared,
            commands: commands_rx,
            cancel: cancel.clone(),
        };

        self.connection = Some(ConnectionHandle {
            commands: commands_tx,
            cancel,
            task: runtime.spawn(task.run()),
        });
        Ok(())
    }

    fn subscribe(&mut self, destination: &str, handler: FrameHandler) -> Result<(), ProtocolError> {
        let mut handlers = self.shared.handlers();
        if !self.shared.is_connected() {
            return Err(ProtocolError::NotConnected);
        }

        if let Some(existing) = handlers.subscriptions.get_mut(destination) {
            tracing::debug!("Replacing handler of '{}' ({})", destination, existing.id);
            existing.handler = handler;
            return Ok(());
        }

        let id = format!("sub-{}", handlers.next_subscription_id);
        handlers.next_subscription_id += 1;
        let frame = Frame::new(Command::Subscribe)
            .with_header("id", &id)
            .with_header("destination", destination)
            .with_header("ack", "auto");
        self.queue(frame)?;

        tracing::debug!("Subscribed to '{}' as {}", destination, id);
        handlers
            .subscriptions
            .insert(destination.to_string(), Subscription { id, handler });
        Ok(())
    }

    fn publish(&self, destination: &str, body: &str) -> Result<(), ProtocolError> {
        let _handlers = self.shared.handlers();
        if !self.shared.is_connected() {
            return Err(ProtocolError::NotConnected);
        }

        let frame = Frame::new(Command::Send)
            .with_header("destination", destination)
            .with_header("content-type", "application/json")
            .with_body(body);
        self.queue(frame)
    }

    fn disconnect(&mut self) {
        let was_connected = {
            let mut handlers = self.shared.handlers();
            handlers.on_event = None;
            handlers.subscriptions.clear();
            self.shared.connected.swap(false, Ordering::AcqRel)
        };

        let Some(connection) = self.connection.take() else {
            return;
        };
        if was_connected {
            // The task drains commands before honoring cancellation.
            let _ = connection.commands.send(Outgoing::Disconnect);
        }
        connection.cancel.cancel();
        tracing::info!(
            "Disconnected from {} (was connected: {})",
            self.endpoint,
            was_connected
        );
    }

    fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }
}

impl<C: Connector> Drop for StompClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ============================================================================
// Connection task
// ============================================================================

/// Why an established STOMP session ended.
enum SessionEnd {
    /// disconnect() was called.
    Shutdown,
    /// Transport failure or heart-beat timeout; reconnect.
    Lost(String),
    /// Broker sent ERROR; give up.
    Rejected(String),
}

enum AttemptError {
    Transport(TransportError),
    Rejected(String),
}

struct ConnectionTask<C: Connector> {
    connector: Arc<C>,
    endpoint: Endpoint,
    config: ClientConfig,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Outgoing>,
    cancel: CancellationToken,
}

impl<C: Connector> ConnectionTask<C> {
    /// Keep a STOMP session up until cancelled, rejected, or out of attempts.
    async fn run(mut self) {
        tracing::info!("Connection task for {} starting", self.endpoint);
        let mut failed_attempts: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let connect_timeout = self.config.connect_timeout;
            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = timeout(connect_timeout, self.establish()) => result.unwrap_or(
                    Err(AttemptError::Transport(TransportError::Timeout(connect_timeout)))
                ),
            };

            match attempt {
                Ok((mut transport, heart_beat)) => {
                    if self.cancel.is_cancelled() || !self.shared.mark_connected(&mut self.commands) {
                        let _ = transport.close().await;
                        break;
                    }
                    failed_attempts = 0;
                    tracing::info!(
                        "STOMP session established with {} (send every {:?}, expect every {:?})",
                        self.endpoint,
                        heart_beat.send_every,
                        heart_beat.expect_every
                    );
                    self.shared.emit(ClientEvent::Connected);

                    match self.message_loop(&mut transport, heart_beat).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Lost(reason) => {
                            tracing::warn!("Connection lost, will reconnect: {}", reason);
                            self.shared.mark_lost();
                            let _ = transport.close().await;
                            self.shared.emit(ClientEvent::ConnectionLost { reason });
                        }
                        SessionEnd::Rejected(message) => {
                            tracing::error!("Broker reported an error: {}", message);
                            self.shared.mark_lost();
                            let _ = transport.close().await;
                            self.shared.emit(ClientEvent::ProtocolError { message });
                            break;
                        }
                    }
                }
                Err(AttemptError::Transport(e)) => {
                    failed_attempts = failed_attempts.saturating_add(1);
                    tracing::debug!("Connection attempt {} failed: {}", failed_attempts, e);
                    self.shared.emit(ClientEvent::ConnectionLost {
                        reason: e.to_string(),
                    });
                }
                Err(AttemptError::Rejected(message)) => {
                    tracing::error!("Handshake rejected: {}", message);
                    self.shared.emit(ClientEvent::ProtocolError { message });
                    break;
                }
            }

            if let Some(max) = self.config.max_reconnect_attempts
                && failed_attempts >= max
            {
                let message = format!("gave up after {failed_attempts} failed connection attempts");
                tracing::error!("Reconnect abandoned: {}", message);
                self.shared.emit(ClientEvent::ProtocolError { message });
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.config.reconnect_delay) => {}
            }
        }

        tracing::debug!("Connection task for {} exited", self.endpoint);
    }

    /// Open the transport and run the CONNECT / CONNECTED exchange.
    async fn establish(&self) -> Result<(C::Transport, NegotiatedHeartBeat), AttemptError> {
        let mut transport = self
            .connector
            .connect(&self.endpoint)
            .await
            .map_err(AttemptError::Transport)?;

        let local = self.config.heart_beat();
        let connect = Frame::new(Command::Connect)
            .with_header("accept-version", STOMP_VERSION)
            .with_header("host", self.endpoint.host())
            .with_header("heart-beat", local.to_string());
        transport
            .send(connect.encode())
            .await
            .map_err(AttemptError::Transport)?;

        loop {
            let raw = match transport.recv().await {
                Some(Ok(raw)) => raw,
                Some(Err(e)) => return Err(AttemptError::Transport(e)),
                None => return Err(AttemptError::Transport(TransportError::Closed)),
            };

            let frame = match decode_message(&raw) {
                Ok(WireMessage::HeartBeat) => continue,
                Ok(WireMessage::Frame(frame)) => frame,
                Err(e) => {
                    return Err(AttemptError::Rejected(format!(
                        "malformed handshake frame: {e}"
                    )));
                }
            };

            return match frame.command {
                Command::Connected => {
                    let remote = match frame.header("heart-beat") {
                        Some(value) => HeartBeat::parse(value)
                            .map_err(|e| AttemptError::Rejected(e.to_string()))?,
                        None => HeartBeat::disabled(),
                    };
                    Ok((transport, local.negotiate(&remote)))
                }
                Command::Error => Err(AttemptError::Rejected(error_message(&frame))),
                other => Err(AttemptError::Rejected(format!(
                    "unexpected {other} frame during handshake"
                ))),
            };
        }
    }

    /// Pump frames both ways until the session ends.
    async fn message_loop(
        &mut self,
        transport: &mut C::Transport,
        heart_beat: NegotiatedHeartBeat,
    ) -> SessionEnd {
        let mut ticker = heart_beat.send_every.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let grace = heart_beat
            .expect_every
            .map(|period| period * HEARTBEAT_GRACE_FACTOR);
        let watchdog = sleep(grace.unwrap_or(Duration::MAX / 4));
        tokio::pin!(watchdog);

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Outgoing::Frame(frame)) => {
                        tracing::trace!("Sending {} frame", frame.command);
                        if let Err(e) = transport.send(frame.encode()).await {
                            return SessionEnd::Lost(e.to_string());
                        }
                    }
                    Some(Outgoing::Disconnect) | None => {
                        send_disconnect(transport).await;
                        return SessionEnd::Shutdown;
                    }
                },

                _ = self.cancel.cancelled() => {
                    let _ = transport.close().await;
                    return SessionEnd::Shutdown;
                }

                incoming = transport.recv() => {
                    let raw = match incoming {
                        Some(Ok(raw)) => raw,
                        Some(Err(e)) => return SessionEnd::Lost(e.to_string()),
                        None => return SessionEnd::Lost(TransportError::Closed.to_string()),
                    };
                    if let Some(grace) = grace {
                        watchdog.as_mut().reset(Instant::now() + grace);
                    }
                    if let Some(end) = self.handle_wire(&raw) {
                        return end;
                    }
                }

                _ = next_tick(&mut ticker) => {
                    if let Err(e) = transport.send(HEARTBEAT.to_string()).await {
                        return SessionEnd::Lost(e.to_string());
                    }
                    tracing::trace!("Sent heart-beat");
                }

                _ = &mut watchdog, if grace.is_some() => {
                    return SessionEnd::Lost(format!(
                        "no heart-beat from broker within {:?}",
                        grace.unwrap_or_default()
                    ));
                }
            }
        }
    }

    fn handle_wire(&self, raw: &str) -> Option<SessionEnd> {
        let frame = match decode_message(raw) {
            Ok(WireMessage::HeartBeat) => {
                tracing::trace!("Received heart-beat");
                return None;
            }
            Ok(WireMessage::Frame(frame)) => frame,
            Err(e) => {
                // Keep the session; one bad frame is not worth a reconnect.
                tracing::warn!("Dropping malformed frame: {}", e);
                return None;
            }
        };

        match frame.command {
            Command::Message => self.shared.dispatch(&frame),
            Command::Receipt => tracing::debug!("Receipt {:?}", frame.header("receipt-id")),
            Command::Error => return Some(SessionEnd::Rejected(error_message(&frame))),
            other => tracing::warn!("Ignoring unexpected {} frame", other),
        }
        None
    }
}

async fn send_disconnect<T: Transport>(transport: &mut T) {
    let frame = Frame::new(Command::Disconnect).with_header("receipt", DISCONNECT_RECEIPT);
    if let Err(e) = transport.send(frame.encode()).await {
        tracing::debug!("DISCONNECT not delivered: {}", e);
    }
    if let Err(e) = transport.close().await {
        tracing::debug!("Transport close failed: {}", e);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn error_message(frame: &Frame) -> String {
    match frame.header("message") {
        Some(message) if !message.is_empty() => message.to_string(),
        _ if !frame.body.trim().is_empty() => frame.body.trim().to_string(),
        _ => "broker reported an error".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
