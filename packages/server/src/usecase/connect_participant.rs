//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - WebSocket 接続の登録（重複チェック）
//!
//! ### なぜこのテストが必要か
//! - 接続ごとに購読とユーザー名を保持するセッションが作られることを保証
//! - 同じ接続 ID の二重登録を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 異常系：登録済みの接続 ID での登録試行

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{ConnectionId, SessionRepository};

use super::error::UseCaseError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 接続を登録する
    ///
    /// # Arguments
    ///
    /// * `id` - 接続 ID
    /// * `sender` - この接続へのフレーム送信チャンネル
    pub async fn execute(
        &self,
        id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<(), UseCaseError> {
        self.repository.add_session(id, sender).await?;
        Ok(())
    }
}
