//! Test fixtures for end-to-end tests against the reference broker.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use agora_client::{
    config::ClientConfig,
    domain::ProtocolClient,
    infrastructure::{Endpoint, StompClient, WebSocketConnector},
    usecase::{ChatSession, SessionInput},
};
use agora_server::infrastructure::stomp::SERVER_HEART_BEAT;
use tokio::{net::TcpListener, sync::mpsc::UnboundedReceiver, task::JoinHandle};

/// Broker running on an ephemeral local port; stopped on drop.
pub struct TestBroker {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestBroker {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            agora_server::serve(listener, SERVER_HEART_BEAT, std::future::pending())
                .await
                .expect("Broker failed");
        });
        Self { addr, handle }
    }

    /// Endpoint in the `http://` form users configure.
    pub fn endpoint(&self) -> String {
        format!("http://{}{}", self.addr, agora_server::WS_PATH)
    }
}

impl Drop for TestBroker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Address nothing listens on.
pub async fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}/ws-chat")
}

pub fn test_config(endpoint: String) -> ClientConfig {
    ClientConfig {
        endpoint,
        reconnect_delay: Duration::from_millis(100),
        connect_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

/// A chat session wired to the real STOMP client, plus its input queue.
pub struct Participant {
    pub session: ChatSession<StompClient<WebSocketConnector>>,
    inputs: UnboundedReceiver<SessionInput>,
}

impl Participant {
    pub fn new(config: ClientConfig) -> Self {
        let endpoint = Endpoint::parse(&config.endpoint).expect("Invalid endpoint");
        let client = StompClient::new(WebSocketConnector, endpoint, config);
        let (session, inputs) = ChatSession::new(client);
        Self { session, inputs }
    }

    /// Apply session inputs until `done` holds. Panics after 5 seconds.
    pub async fn run_until<F>(&mut self, done: F)
    where
        F: Fn(&ChatSession<StompClient<WebSocketConnector>>) -> bool,
    {
        let session = &mut self.session;
        let inputs = &mut self.inputs;
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&*session) {
                let input = inputs.recv().await.expect("Session input channel closed");
                session.handle(input);
            }
        })
        .await
        .expect("Condition not reached in time");
    }

    pub fn log_contents(&self) -> Vec<String> {
        self.session
            .log()
            .iter()
            .map(|event| format!("{} {} {}", event.event_type(), event.sender(), event.content()))
            .collect()
    }
}

pub fn is_connected<C: ProtocolClient>(session: &ChatSession<C>) -> bool {
    session.status() == agora_client::domain::SessionStatus::Connected
}
