//! Broker-side STOMP frame builders.

use agora_shared::stomp::{Command, Frame, HeartBeat, STOMP_VERSION};
use uuid::Uuid;

/// Heart-beat offer the broker answers CONNECT with.
pub const SERVER_HEART_BEAT: HeartBeat = HeartBeat::new(4000, 4000);

/// Value of the `server` header on CONNECTED.
pub const SERVER_NAME: &str = concat!("agora/", env!("CARGO_PKG_VERSION"));

pub fn connected_frame(heart_beat: &HeartBeat, session: &str) -> Frame {
    Frame::new(Command::Connected)
        .with_header("version", STOMP_VERSION)
        .with_header("heart-beat", heart_beat.to_string())
        .with_header("session", session)
        .with_header("server", SERVER_NAME)
}

/// MESSAGE frame delivering `body` to one subscription.
pub fn message_frame(destination: &str, subscription_id: &str, body: &str) -> Frame {
    Frame::new(Command::Message)
        .with_header("destination", destination)
        .with_header("subscription", subscription_id)
        .with_header("message-id", Uuid::new_v4().to_string())
        .with_header("content-type", "application/json")
        .with_body(body)
}

pub fn error_frame(message: &str, detail: &str) -> Frame {
    Frame::new(Command::Error)
        .with_header("message", message)
        .with_header("content-type", "text/plain")
        .with_body(detail)
}

pub fn receipt_frame(receipt_id: &str) -> Frame {
    Frame::new(Command::Receipt).with_header("receipt-id", receipt_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_frame_headers() {
        // テスト項目: CONNECTED フレームにバージョンと heart-beat が含まれる
        // given (前提条件):
        let heart_beat = HeartBeat::new(4000, 10000);

        // when (操作):
        let frame = connected_frame(&heart_beat, "c-1");

        // then (期待する結果):
        assert_eq!(frame.command, Command::Connected);
        assert_eq!(frame.header("version"), Some("1.2"));
        assert_eq!(frame.header("heart-beat"), Some("4000,10000"));
        assert_eq!(frame.header("session"), Some("c-1"));
    }

    #[test]
    fn test_message_frames_get_distinct_ids() {
        // テスト項目: MESSAGE フレームごとに異なる message-id が振られる
        // when (操作):
        let a = message_frame("/topic/public", "sub-0", "{}");
        let b = message_frame("/topic/public", "sub-0", "{}");

        // then (期待する結果):
        assert_eq!(a.header("subscription"), Some("sub-0"));
        assert_eq!(a.header("destination"), Some("/topic/public"));
        assert_eq!(a.body, "{}");
        assert_ne!(a.header("message-id"), b.header("message-id"));
    }

    #[test]
    fn test_error_and_receipt_frames() {
        let error = error_frame("malformed frame", "Unknown STOMP command: HELLO");
        let receipt = receipt_frame("disconnect");

        assert_eq!(error.command, Command::Error);
        assert_eq!(error.header("message"), Some("malformed frame"));
        assert_eq!(receipt.header("receipt-id"), Some("disconnect"));
    }
}
