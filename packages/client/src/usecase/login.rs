//! UseCase: ログイン処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession::login() メソッド
//! - 接続完了後の購読と JOIN 通知
//!
//! ### なぜこのテストが必要か
//! - 不正なユーザー名がネットワーク操作前に拒否されることを保証
//! - Disconnected → Connecting → Connected の遷移を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：1〜20 文字のユーザー名でのログイン
//! - 異常系：空文字列・21 文字以上のユーザー名、接続開始の失敗
//! - エッジケース：前後の空白、マルチバイト文字、ログイン中の再ログイン

use crate::domain::{ProtocolClient, SessionStatus, Username};

use super::{
    error::SessionError,
    session::{ChatSession, Notice},
};

impl<C: ProtocolClient> ChatSession<C> {
    /// ログインを開始する
    ///
    /// ユーザー名を検証し、Connecting に遷移してプロトコルクライアントの接続を開始する。
    /// Connected への遷移は接続完了の通知を `handle()` した時点で行われる。
    ///
    /// # Errors
    ///
    /// * `SessionError::Validation` - ユーザー名が空、または 20 文字を超える（状態は変わらない）
    /// * `SessionError::AlreadyActive` - Disconnected 以外の状態で呼ばれた
    /// * `SessionError::Protocol` - 接続を開始できなかった
    pub fn login(&mut self, raw_username: &str) -> Result<(), SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        if self.status != SessionStatus::Disconnected {
            return Err(SessionError::AlreadyActive);
        }

        // 1. ネットワーク操作の前に検証
        let username = Username::new(raw_username).map_err(|e| {
            self.notices.push(Notice::InputRejected {
                reason: e.to_string(),
            });
            SessionError::from(e)
        })?;

        // 2. Connecting に遷移
        self.epoch = self.epoch.wrapping_add(1);
        self.status = SessionStatus::Connecting;
        self.username = Some(username.clone());
        self.log.clear();

        // 3. 接続開始（完了は非同期に通知される）
        let handler = self.event_handler();
        if let Err(e) = self.client.connect(handler) {
            self.reset();
            self.notices.push(Notice::ConnectionFailed {
                message: e.to_string(),
            });
            return Err(e.into());
        }

        tracing::info!("Connecting as '{}'", username);
        Ok(())
    }
}
