//! Chat event model.

use std::fmt;

use super::{
    error::ChatEventError,
    value_object::{MESSAGE_MAX_CHARS, MessageContent, Timestamp, USERNAME_MAX_CHARS, Username},
};

/// Kind of chat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Join,
    Leave,
    Chat,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Join => "JOIN",
            EventType::Leave => "LEAVE",
            EventType::Chat => "CHAT",
        };
        f.write_str(name)
    }
}

/// Immutable chat event as rendered in the message log.
///
/// `event_type` decides which fields matter: CHAT events always carry
/// content, JOIN and LEAVE may have empty content. `timestamp` is set by
/// the broker and is absent on events built locally for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    sender: String,
    content: String,
    event_type: EventType,
    timestamp: Option<Timestamp>,
}

impl ChatEvent {
    /// Build an event from untrusted parts, checking the event invariants.
    ///
    /// # Errors
    ///
    /// Returns a `ChatEventError` if the sender is empty or too long, the
    /// content is too long, or a CHAT event has no content.
    pub fn new(
        sender: String,
        content: String,
        event_type: EventType,
        timestamp: Option<Timestamp>,
    ) -> Result<Self, ChatEventError> {
        if sender.trim().is_empty() {
            return Err(ChatEventError::SenderEmpty);
        }
        let sender_len = sender.chars().count();
        if sender_len > USERNAME_MAX_CHARS {
            return Err(ChatEventError::SenderTooLong {
                max: USERNAME_MAX_CHARS,
                actual: sender_len,
            });
        }
        if event_type == EventType::Chat && content.trim().is_empty() {
            return Err(ChatEventError::ContentEmpty);
        }
        let content_len = content.chars().count();
        if content_len > MESSAGE_MAX_CHARS {
            return Err(ChatEventError::ContentTooLong {
                max: MESSAGE_MAX_CHARS,
                actual: content_len,
            });
        }
        Ok(Self {
            sender,
            content,
            event_type,
            timestamp,
        })
    }

    /// JOIN announcement for the given user (content is filled in by the broker).
    pub fn join(username: &Username) -> Self {
        Self {
            sender: username.as_str().to_string(),
            content: String::new(),
            event_type: EventType::Join,
            timestamp: None,
        }
    }

    /// Outgoing chat message.
    pub fn chat(username: &Username, content: &MessageContent) -> Self {
        Self {
            sender: username.as_str().to_string(),
            content: content.as_str().to_string(),
            event_type: EventType::Chat,
            timestamp: None,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    /// JOIN and LEAVE are system notices rather than user messages.
    pub fn is_system(&self) -> bool {
        matches!(self.event_type, EventType::Join | EventType::Leave)
    }
}
