//! WebSocket transport built on tokio-tungstenite.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::{Connector, Endpoint, Transport, TransportError};

/// Opens plain WebSocket connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

/// One open WebSocket connection.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport, TransportError> {
        let (stream, response) = connect_async(endpoint.url())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        tracing::debug!("WebSocket to {} upgraded ({})", endpoint, response.status());
        Ok(WebSocketTransport { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            };

            match message {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::warn!(
                        "Dropping non UTF-8 binary message ({} bytes)",
                        bytes.len()
                    ),
                },
                Message::Close(frame) => {
                    tracing::debug!("Peer sent close frame {:?}", frame);
                    return None;
                }
                // Control frames are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
