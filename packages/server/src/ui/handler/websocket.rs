//! WebSocket connection handlers speaking STOMP 1.2.
//!
//! Every websocket message carries one STOMP frame or a bare EOL heart-beat.
//! Frames that fan out to subscribers travel through the per-connection
//! channel registered in the repository; direct replies (CONNECTED, RECEIPT,
//! ERROR) are written to the socket by the connection loop.

use std::{sync::Arc, time::Duration};

use agora_shared::{
    dto::{ADD_USER_DESTINATION, ChatMessageDto, SEND_MESSAGE_DESTINATION},
    stomp::{
        Command, Frame, HEARTBEAT, HeartBeat, NegotiatedHeartBeat, STOMP_VERSION, WireMessage,
        decode_message,
    },
};
use axum::{
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior, interval_at, sleep},
};

use crate::{
    domain::ConnectionId,
    infrastructure::stomp::{
        connected_frame, error_frame, message_frame, receipt_frame,
    },
    ui::state::AppState,
    usecase::{
        AddUserUseCase, Broadcast, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        SendMessageUseCase, SubscribeUseCase,
    },
};

/// Silence tolerated from a client, as a multiple of its heart-beat period.
const HEARTBEAT_GRACE_FACTOR: u32 = 2;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Outcome of one inbound frame.
enum Action {
    Continue,
    Reply(Frame),
    /// CONNECT accepted; start heart-beating with the agreed periods
    Connected(Frame, NegotiatedHeartBeat),
    /// Write the frame, if any, then end the connection
    Close(Option<Frame>),
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();

    // Create a channel for this connection to receive fan-out frames
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let connect_usecase = ConnectParticipantUseCase::new(state.repository.clone());
    if let Err(e) = connect_usecase.execute(connection_id.clone(), tx).await {
        tracing::warn!("Failed to register connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Connection '{}' opened", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let mut connection = StompConnection::new(connection_id.clone(), state.clone());

    let mut ticker: Option<Interval> = None;
    let mut grace: Option<Duration> = None;
    let watchdog = sleep(Duration::MAX / 4);
    tokio::pin!(watchdog);

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(text) = outgoing else { break };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Connection '{}' closed by client", connection_id);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                };
                if let Some(grace) = grace {
                    watchdog.as_mut().reset(Instant::now() + grace);
                }

                match connection.handle_text(text.as_str()).await {
                    Action::Continue => {}
                    Action::Reply(frame) => {
                        if send_frame(&mut sender, &frame).await.is_err() {
                            break;
                        }
                    }
                    Action::Connected(frame, heart_beat) => {
                        if send_frame(&mut sender, &frame).await.is_err() {
                            break;
                        }
                        ticker = heart_beat.send_every.map(|period| {
                            let mut ticker = interval_at(Instant::now() + period, period);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                            ticker
                        });
                        grace = heart_beat
                            .expect_every
                            .map(|period| period * HEARTBEAT_GRACE_FACTOR);
                        if let Some(grace) = grace {
                            watchdog.as_mut().reset(Instant::now() + grace);
                        }
                    }
                    Action::Close(frame) => {
                        if let Some(frame) = frame {
                            let _ = send_frame(&mut sender, &frame).await;
                        }
                        let _ = sender.close().await;
                        break;
                    }
                }
            }

            _ = next_tick(&mut ticker) => {
                if sender.send(Message::Text(Utf8Bytes::from_static(HEARTBEAT))).await.is_err() {
                    break;
                }
            }

            _ = &mut watchdog, if grace.is_some() => {
                tracing::warn!(
                    "No heart-beat from '{}' within {:?}, closing",
                    connection_id,
                    grace.unwrap_or_default()
                );
                let _ = sender.close().await;
                break;
            }
        }
    }

    // Use DisconnectParticipantUseCase to handle disconnection
    let disconnect_usecase = DisconnectParticipantUseCase::new(state.repository.clone());
    match disconnect_usecase.execute(&connection_id).await {
        Ok(Some(broadcast)) => deliver(&broadcast),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to unregister connection '{}': {}", connection_id, e);
        }
    }
    tracing::info!("Connection '{}' removed from registry", connection_id);
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &Frame,
) -> Result<(), axum::Error> {
    sender.send(Message::Text(frame.encode().into())).await
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Encode `broadcast` once and queue a MESSAGE frame for every recipient.
fn deliver(broadcast: &Broadcast) {
    let body = match serde_json::to_string(&broadcast.event) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to encode chat event: {}", e);
            return;
        }
    };
    for recipient in &broadcast.recipients {
        let frame = message_frame(broadcast.destination, &recipient.subscription_id, &body);
        if recipient.sender.send(frame.encode()).is_err() {
            tracing::warn!(
                "Failed to queue message for connection '{}'",
                recipient.connection_id
            );
        }
    }
    tracing::debug!(
        "Delivered {:?} from '{}' to {} subscription(s)",
        broadcast.event.r#type,
        broadcast.event.sender,
        broadcast.recipients.len()
    );
}

/// STOMP state of one websocket connection.
struct StompConnection {
    id: ConnectionId,
    state: Arc<AppState>,
    connected: bool,
}

impl StompConnection {
    fn new(id: ConnectionId, state: Arc<AppState>) -> Self {
        Self {
            id,
            state,
            connected: false,
        }
    }

    async fn handle_text(&mut self, raw: &str) -> Action {
        let frame = match decode_message(raw) {
            Ok(WireMessage::HeartBeat) => return Action::Continue,
            Ok(WireMessage::Frame(frame)) => frame,
            Err(e) => {
                tracing::warn!("Malformed frame from '{}': {}", self.id, e);
                return Action::Close(Some(error_frame("malformed frame", &e.to_string())));
            }
        };
        tracing::debug!("Received {} frame from '{}'", frame.command, self.id);

        match frame.command {
            Command::Connect | Command::Stomp => self.on_connect(&frame),
            _ if !self.connected => Action::Close(Some(error_frame(
                "not connected",
                &format!("{} frame received before CONNECT", frame.command),
            ))),
            Command::Subscribe => self.on_subscribe(&frame).await,
            Command::Unsubscribe => self.on_unsubscribe(&frame).await,
            Command::Send => self.on_send(&frame).await,
            Command::Disconnect => {
                tracing::info!("Connection '{}' sent DISCONNECT", self.id);
                Action::Close(frame.header("receipt").map(receipt_frame))
            }
            other => Action::Close(Some(error_frame(
                "unsupported command",
                &format!("{other} is not a client frame"),
            ))),
        }
    }

    fn on_connect(&mut self, frame: &Frame) -> Action {
        if self.connected {
            return Action::Close(Some(error_frame(
                "already connected",
                "CONNECT received twice",
            )));
        }
        if let Some(versions) = frame.header("accept-version")
            && !versions.split(',').any(|v| v.trim() == STOMP_VERSION)
        {
            return Action::Close(Some(error_frame(
                "unsupported protocol version",
                &format!("supported version is {STOMP_VERSION}"),
            )));
        }
        let client_heart_beat = match frame.header("heart-beat") {
            Some(value) => match HeartBeat::parse(value) {
                Ok(heart_beat) => heart_beat,
                Err(e) => {
                    return Action::Close(Some(error_frame("invalid heart-beat", &e.to_string())));
                }
            },
            None => HeartBeat::disabled(),
        };

        self.connected = true;
        tracing::info!(
            "STOMP session '{}' established (client heart-beat {})",
            self.id,
            client_heart_beat
        );
        let server_heart_beat = self.state.heart_beat;
        Action::Connected(
            connected_frame(&server_heart_beat, self.id.as_str()),
            server_heart_beat.negotiate(&client_heart_beat),
        )
    }

    async fn on_subscribe(&self, frame: &Frame) -> Action {
        let (Some(subscription_id), Some(destination)) =
            (frame.header("id"), frame.header("destination"))
        else {
            return Action::Close(Some(error_frame(
                "invalid SUBSCRIBE",
                "id and destination headers are required",
            )));
        };

        let usecase = SubscribeUseCase::new(self.state.repository.clone());
        if let Err(e) = usecase
            .subscribe(&self.id, subscription_id, destination)
            .await
        {
            tracing::warn!("Subscription failed for '{}': {}", self.id, e);
            return Action::Close(Some(error_frame("subscription failed", &e.to_string())));
        }
        tracing::info!(
            "'{}' subscribed to {} as {}",
            self.id,
            destination,
            subscription_id
        );
        receipt_for(frame)
    }

    async fn on_unsubscribe(&self, frame: &Frame) -> Action {
        let Some(subscription_id) = frame.header("id") else {
            return Action::Close(Some(error_frame(
                "invalid UNSUBSCRIBE",
                "id header is required",
            )));
        };

        let usecase = SubscribeUseCase::new(self.state.repository.clone());
        match usecase.unsubscribe(&self.id, subscription_id).await {
            Ok(true) => tracing::info!("'{}' unsubscribed {}", self.id, subscription_id),
            Ok(false) => tracing::debug!(
                "'{}' unsubscribed unknown subscription {}",
                self.id,
                subscription_id
            ),
            Err(e) => {
                return Action::Close(Some(error_frame("unsubscribe failed", &e.to_string())));
            }
        }
        receipt_for(frame)
    }

    async fn on_send(&self, frame: &Frame) -> Action {
        let Some(destination) = frame.header("destination") else {
            return Action::Close(Some(error_frame(
                "invalid SEND",
                "destination header is required",
            )));
        };

        let broadcast = match destination {
            SEND_MESSAGE_DESTINATION => {
                let message = match parse_chat(frame) {
                    Ok(message) => message,
                    Err(action) => return action,
                };
                SendMessageUseCase::new(self.state.repository.clone())
                    .execute(message)
                    .await
            }
            ADD_USER_DESTINATION => {
                let announcement = match parse_chat(frame) {
                    Ok(message) => message,
                    Err(action) => return action,
                };
                let usecase = AddUserUseCase::new(self.state.repository.clone());
                match usecase.execute(&self.id, announcement).await {
                    Ok(broadcast) => broadcast,
                    Err(e) => {
                        return Action::Close(Some(error_frame("join failed", &e.to_string())));
                    }
                }
            }
            other => {
                tracing::warn!("Ignoring SEND to unknown destination '{}'", other);
                return receipt_for(frame);
            }
        };

        deliver(&broadcast);
        receipt_for(frame)
    }
}

fn parse_chat(frame: &Frame) -> Result<ChatMessageDto, Action> {
    serde_json::from_str(&frame.body).map_err(|e| {
        tracing::warn!("Invalid chat payload: {}", e);
        Action::Close(Some(error_frame("invalid chat payload", &e.to_string())))
    })
}

/// RECEIPT for a frame that asked for one.
fn receipt_for(frame: &Frame) -> Action {
    match frame.header("receipt") {
        Some(receipt) => Action::Reply(receipt_frame(receipt)),
        None => Action::Continue,
    }
}
