//! Test fixtures for broker integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use agora_server::infrastructure::stomp::SERVER_HEART_BEAT;
use agora_shared::stomp::{Command, Frame, HeartBeat, WireMessage, decode_message};
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Broker running on an ephemeral local port; stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_heart_beat(SERVER_HEART_BEAT).await
    }

    pub async fn start_with_heart_beat(heart_beat: HeartBeat) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            agora_server::serve(listener, heart_beat, std::future::pending())
                .await
                .expect("Broker failed");
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, agora_server::WS_PATH)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Raw STOMP peer used to script the broker from the outside.
pub struct StompPeer {
    ws: WsStream,
}

impl StompPeer {
    pub async fn open(server: &TestServer) -> Self {
        let (ws, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to open websocket");
        Self { ws }
    }

    /// Open a websocket and complete the STOMP handshake with heart-beats disabled.
    pub async fn connect(server: &TestServer) -> Self {
        Self::connect_with_heart_beat(server, HeartBeat::disabled()).await
    }

    pub async fn connect_with_heart_beat(server: &TestServer, heart_beat: HeartBeat) -> Self {
        let mut peer = Self::open(server).await;
        peer.send(
            Frame::new(Command::Connect)
                .with_header("accept-version", "1.2")
                .with_header("host", "localhost")
                .with_header("heart-beat", heart_beat.to_string()),
        )
        .await;
        let connected = peer.recv().await;
        assert_eq!(connected.command, Command::Connected);
        peer
    }

    pub async fn send(&mut self, frame: Frame) {
        self.send_raw(frame.encode()).await;
    }

    pub async fn send_raw(&mut self, raw: String) {
        self.ws
            .send(Message::Text(raw.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn subscribe(&mut self, id: &str, destination: &str) {
        self.send(
            Frame::new(Command::Subscribe)
                .with_header("id", id)
                .with_header("destination", destination)
                .with_header("receipt", format!("sub-{id}")),
        )
        .await;
        let receipt = self.recv().await;
        assert_eq!(receipt.command, Command::Receipt);
    }

    /// Next frame, skipping heart-beats. Panics after 5 seconds.
    pub async fn recv(&mut self) -> Frame {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => match decode_message(text.as_str()) {
                        Ok(WireMessage::Frame(frame)) => return frame,
                        Ok(WireMessage::HeartBeat) => continue,
                        Err(e) => panic!("Broker sent an undecodable frame: {e}"),
                    },
                    Some(Ok(_)) => continue,
                    other => panic!("Websocket ended while waiting for a frame: {other:?}"),
                }
            }
        })
        .await
        .expect("Timed out waiting for a frame")
    }

    /// Next text message as sent, heart-beats included. Panics after 5 seconds.
    pub async fn recv_raw(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                    Some(Ok(_)) => continue,
                    other => panic!("Websocket ended while waiting for data: {other:?}"),
                }
            }
        })
        .await
        .expect("Timed out waiting for data")
    }

    /// Wait until the broker closes the websocket.
    pub async fn expect_closed(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await
        .expect("Broker did not close the connection");
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
