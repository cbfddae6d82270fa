//! Transport adapter: a duplex text-message connection to the broker.

mod websocket;

use std::{fmt, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

pub use websocket::{WebSocketConnector, WebSocketTransport};

/// Socket-level failures. All of them lead to the reconnect path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint URL cannot be used
    #[error("Invalid endpoint '{0}': expected an http(s):// or ws(s):// URL")]
    InvalidEndpoint(String),

    /// Opening the connection failed
    #[error("Failed to connect: {0}")]
    Connect(String),

    /// Writing a message failed
    #[error("Failed to send: {0}")]
    Send(String),

    /// Reading a message failed
    #[error("Failed to receive: {0}")]
    Receive(String),

    /// Peer closed the connection
    #[error("Connection closed")]
    Closed,

    /// Operation did not finish in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Resolved broker endpoint.
///
/// The broker is addressed like an HTTP resource, so `http`/`https` URLs are
/// accepted and mapped onto `ws`/`wss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    host: String,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, TransportError> {
        let invalid = || TransportError::InvalidEndpoint(raw.to_string());
        let trimmed = raw.trim();
        let (scheme, rest) = trimmed.split_once("://").ok_or_else(invalid)?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(invalid()),
        };

        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        if host.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            url: format!("{scheme}://{rest}"),
            host: host.to_string(),
        })
    }

    /// WebSocket URL to open.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Value for the STOMP `host` header (authority without credentials).
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// An open connection carrying one protocol frame per message.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next message; `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports; one call per (re)connection attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_maps_http_to_ws() {
        // テスト項目: http の URL は ws に変換される
        // when (操作):
        let endpoint = Endpoint::parse("http://localhost:8080/ws-chat").unwrap();

        // then (期待する結果):
        assert_eq!(endpoint.url(), "ws://localhost:8080/ws-chat");
        assert_eq!(endpoint.host(), "localhost:8080");
    }

    #[test]
    fn test_endpoint_maps_https_to_wss() {
        let endpoint = Endpoint::parse("HTTPS://user:pw@chat.example.com/ws-chat?x=1").unwrap();

        assert_eq!(endpoint.url(), "wss://user:pw@chat.example.com/ws-chat?x=1");
        assert_eq!(endpoint.host(), "chat.example.com");
    }

    #[test]
    fn test_endpoint_accepts_ws_schemes() {
        let endpoint = Endpoint::parse("ws://127.0.0.1:9000/ws-chat").unwrap();

        assert_eq!(endpoint.to_string(), "ws://127.0.0.1:9000/ws-chat");
    }

    #[test]
    fn test_endpoint_rejects_other_input() {
        // テスト項目: 対応していないスキームやホストなしの URL はエラーになる
        for raw in ["ftp://host/ws", "localhost:8080", "ws:///path", ""] {
            assert_eq!(
                Endpoint::parse(raw),
                Err(TransportError::InvalidEndpoint(raw.to_string())),
                "{raw}"
            );
        }
    }
}
