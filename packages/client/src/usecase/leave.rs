//! UseCase: 退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession::leave() メソッド
//!
//! ### なぜこのテストが必要か
//! - 退出後は必ず Disconnected・ユーザー名なし・ログ空になることを保証
//! - leave の冪等性（disconnect は 1 回だけ）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：Connected 中の退出
//! - エッジケース：2 回連続の leave、Connecting 中の leave、未ログインでの leave

use crate::domain::{ProtocolClient, SessionStatus};

use super::session::ChatSession;

impl<C: ProtocolClient> ChatSession<C> {
    /// セッションから退出する
    ///
    /// プロトコルクライアントの disconnect() を呼び（応答は待たない）、
    /// 結果に関わらず Disconnected に戻してユーザー名とログを破棄する。
    /// Disconnected 中は何もしない。
    pub fn leave(&mut self) {
        if self.status == SessionStatus::Disconnected {
            return;
        }

        let username = self.username.take();
        self.client.disconnect();
        self.reset();

        if let Some(username) = username {
            tracing::info!("User '{}' left the chat room", username);
        }
    }
}
