//! Chat payload DTOs shared by the client and the broker.
//!
//! These are the JSON bodies carried inside STOMP `SEND` and `MESSAGE` frames.

use serde::{Deserialize, Serialize};

/// Channel the broker fans every chat event out to.
pub const PUBLIC_TOPIC: &str = "/topic/public";

/// Destination a client publishes its JOIN announcement to.
pub const ADD_USER_DESTINATION: &str = "/app/chat.addUser";

/// Destination a client publishes chat messages to.
pub const SEND_MESSAGE_DESTINATION: &str = "/app/chat.sendMessage";

/// Chat event type, serialized in upper case ("JOIN", "LEAVE", "CHAT").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Chat,
    Join,
    Leave,
}

/// Chat message exchanged between clients through the broker.
///
/// `content` is absent on the JOIN announcement a client publishes, and
/// `timestamp` is only present once the broker has stamped the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
