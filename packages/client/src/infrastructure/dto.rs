//! Conversion between domain chat events and the shared wire DTO.

use agora_shared::dto::{ChatMessageDto, MessageType};

use crate::domain::{ChatEvent, ChatEventError, EventType, Timestamp};

impl From<MessageType> for EventType {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Join => EventType::Join,
            MessageType::Leave => EventType::Leave,
            MessageType::Chat => EventType::Chat,
        }
    }
}

impl From<EventType> for MessageType {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Join => MessageType::Join,
            EventType::Leave => MessageType::Leave,
            EventType::Chat => MessageType::Chat,
        }
    }
}

impl TryFrom<ChatMessageDto> for ChatEvent {
    type Error = ChatEventError;

    fn try_from(dto: ChatMessageDto) -> Result<Self, Self::Error> {
        ChatEvent::new(
            dto.sender,
            dto.content.unwrap_or_default(),
            dto.r#type.into(),
            dto.timestamp.map(Timestamp::new),
        )
    }
}

impl From<&ChatEvent> for ChatMessageDto {
    fn from(event: &ChatEvent) -> Self {
        // Empty content is omitted, as on the JOIN announcement.
        let content = (!event.content().is_empty()).then(|| event.content().to_string());
        Self {
            sender: event.sender().to_string(),
            content,
            r#type: event.event_type().into(),
            timestamp: event.timestamp().map(|t| t.as_str().to_string()),
        }
    }
}

/// Parse a frame body received on the public channel.
pub fn decode_event(body: &str) -> Result<ChatEvent, ChatEventError> {
    let dto: ChatMessageDto =
        serde_json::from_str(body).map_err(|e| ChatEventError::Malformed(e.to_string()))?;
    ChatEvent::try_from(dto)
}

/// Serialize an outgoing event as a frame body.
pub fn encode_event(event: &ChatEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ChatMessageDto::from(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Username};

    #[test]
    fn test_decode_echoed_join() {
        // テスト項目: ブローカーから届いた JOIN イベントを解析できる
        // given (前提条件):
        let body = r#"{"sender":"Alice","type":"JOIN","content":"Alice joined"}"#;

        // when (操作):
        let event = decode_event(body).unwrap();

        // then (期待する結果):
        assert_eq!(event.sender(), "Alice");
        assert_eq!(event.event_type(), EventType::Join);
        assert_eq!(event.content(), "Alice joined");
        assert!(event.timestamp().is_none());
    }

    #[test]
    fn test_decode_chat_with_timestamp() {
        let body = r#"{"sender":"Bob","type":"CHAT","content":"hello","timestamp":"12:00:01"}"#;

        let event = decode_event(body).unwrap();

        assert_eq!(event.event_type(), EventType::Chat);
        assert_eq!(event.timestamp().map(|t| t.as_str()), Some("12:00:01"));
    }

    #[test]
    fn test_decode_rejects_invalid_payloads() {
        // テスト項目: JSON でない本文や不変条件を満たさないイベントはエラーになる
        assert!(matches!(
            decode_event("not json"),
            Err(ChatEventError::Malformed(_))
        ));
        assert_eq!(
            decode_event(r#"{"sender":"Bob","type":"CHAT"}"#),
            Err(ChatEventError::ContentEmpty)
        );
    }

    #[test]
    fn test_encode_join_announcement() {
        // テスト項目: JOIN 通知は sender と type のみを含む
        // given (前提条件):
        let event = ChatEvent::join(&Username::new("Alice").unwrap());

        // when (操作):
        let body = encode_event(&event).unwrap();

        // then (期待する結果):
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, serde_json::json!({"sender": "Alice", "type": "JOIN"}));
    }

    #[test]
    fn test_encode_chat_message() {
        let event = ChatEvent::chat(
            &Username::new("Bob").unwrap(),
            &MessageContent::new("hello").unwrap(),
        );

        let body = encode_event(&event).unwrap();

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sender": "Bob", "content": "hello", "type": "CHAT"})
        );
    }
}
