//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession::send_message() メソッド
//!
//! ### なぜこのテストが必要か
//! - 送信はブローカーへの publish のみで、ログへの楽観的な追加をしないことを保証
//! - 不正な入力・未接続時に publish されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：Connected 中の送信とエコー受信
//! - 異常系：空文字列、501 文字以上、未接続
//! - エッジケース：500 文字ちょうど

use agora_shared::dto::SEND_MESSAGE_DESTINATION;

use crate::{
    domain::{ChatEvent, MessageContent, ProtocolClient, SessionStatus, ValueObjectError},
    infrastructure::dto::encode_event,
};

use super::{
    error::SessionError,
    session::{ChatSession, Notice},
};

impl<C: ProtocolClient> ChatSession<C> {
    /// チャットメッセージを送信する
    ///
    /// ログには追加しない。ブローカーからのエコーを受信した時点でログに現れる。
    ///
    /// # Errors
    ///
    /// * `SessionError::Validation` - 本文が空、または 500 文字を超える
    /// * `SessionError::NotConnected` - Connected 以外の状態
    pub fn send_message(&mut self, raw_content: &str) -> Result<(), SessionError> {
        let content = MessageContent::new(raw_content).map_err(|e| {
            // 空の送信は何もしない。長すぎる本文だけ通知する
            if e != ValueObjectError::MessageContentEmpty {
                self.notices.push(Notice::InputRejected {
                    reason: e.to_string(),
                });
            }
            SessionError::from(e)
        })?;

        if self.status != SessionStatus::Connected {
            return Err(SessionError::NotConnected);
        }
        let username = self.username.as_ref().ok_or(SessionError::NotConnected)?;

        let body = encode_event(&ChatEvent::chat(username, &content))
            .map_err(|e| SessionError::Encode(e.to_string()))?;
        self.client.publish(SEND_MESSAGE_DESTINATION, &body)?;

        tracing::debug!(
            "Message of {} chars published",
            content.as_str().chars().count()
        );
        Ok(())
    }
}
