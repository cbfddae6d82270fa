//! Domain layer for the chat client.
//!
//! This module contains the chat event model, the session status and the
//! protocol client seam. It is independent of the wire DTOs and of any
//! concrete transport.

pub mod client;
pub mod entity;
pub mod error;
pub mod message_log;
pub mod session;
pub mod value_object;

pub use client::{ClientEvent, EventHandler, FrameHandler, InboundFrame, ProtocolClient};
pub use entity::{ChatEvent, EventType};
pub use error::{ChatEventError, ProtocolError, ValueObjectError};
pub use message_log::MessageLog;
pub use session::SessionStatus;
pub use value_object::{MessageContent, Timestamp, Username};
