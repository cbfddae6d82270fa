//! Seam between the session state machine and the pub/sub protocol client.
//!
//! The session only knows this trait; the STOMP implementation lives in the
//! infrastructure layer (dependency inversion), and tests substitute a mock.

#[cfg(test)]
use mockall::automock;

use super::error::ProtocolError;

/// Lifecycle notifications emitted by a protocol client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Handshake completed; subscriptions must be (re-)registered now.
    Connected,

    /// Transport dropped or an attempt failed; the client keeps retrying.
    ConnectionLost { reason: String },

    /// Broker rejected the session, or reconnecting was abandoned.
    /// The client has stopped and will not retry.
    ProtocolError { message: String },
}

/// A frame delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub destination: String,
    pub body: String,
}

/// Callback for lifecycle notifications.
pub type EventHandler = Box<dyn Fn(ClientEvent) + Send + Sync + 'static>;

/// Callback for frames arriving on one channel.
pub type FrameHandler = Box<dyn Fn(InboundFrame) + Send + Sync + 'static>;

/// Framed pub/sub client as used by the chat session.
///
/// Handlers run on the client's own task and must not call back into the
/// client; they are expected to forward work to the session owner.
#[cfg_attr(test, automock)]
pub trait ProtocolClient {
    /// Start maintaining a broker connection and report lifecycle changes to
    /// `on_event`. Returns immediately; `Connected` arrives later.
    fn connect(&mut self, on_event: EventHandler) -> Result<(), ProtocolError>;

    /// Route frames addressed to `destination` to `handler`.
    ///
    /// One handler per destination: subscribing again replaces the handler.
    /// Subscriptions do not survive a reconnect.
    fn subscribe(&mut self, destination: &str, handler: FrameHandler) -> Result<(), ProtocolError>;

    /// Queue `body` for `destination`.
    ///
    /// # Errors
    ///
    /// `ProtocolError::NotConnected` unless the handshake has completed.
    fn publish(&self, destination: &str, body: &str) -> Result<(), ProtocolError>;

    /// Close gracefully and stop reconnecting. Idempotent; once it returns
    /// no handler registered earlier is invoked again.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}
