//! Infrastructure layer.
//!
//! Concrete implementations of the domain seams: the WebSocket transport, the
//! STOMP protocol client and the conversion to and from the wire DTOs.

pub mod dto;
pub mod stomp_client;
pub mod transport;

pub use stomp_client::StompClient;
pub use transport::{Connector, Endpoint, Transport, TransportError, WebSocketConnector};
