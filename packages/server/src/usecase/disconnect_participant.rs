//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 接続の削除と LEAVE イベントの生成
//!
//! ### なぜこのテストが必要か
//! - 参加通知済みのユーザーが去ったことが残りの購読者に通知されることを保証
//! - 参加通知前に切断した接続では何も通知されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加済みユーザーの切断と LEAVE 通知
//! - エッジケース：参加通知前の切断（通知なし）
//! - 異常系：存在しない接続の切断試行

use std::sync::Arc;

use agora_shared::{
    dto::{ChatMessageDto, MessageType},
    time::current_clock_time,
};

use crate::domain::{ConnectionId, SessionRepository};

use super::{broadcast::Broadcast, error::UseCaseError};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Broadcast))` - 残りの購読者に配信する LEAVE イベント
    /// * `Ok(None)` - ユーザー名が未登録のため通知なし
    /// * `Err(UseCaseError)` - 接続が存在しない
    pub async fn execute(&self, id: &ConnectionId) -> Result<Option<Broadcast>, UseCaseError> {
        // 1. Repository から接続を削除（以降の配信先から外れる）
        let session = self.repository.remove_session(id).await?;

        // 2. ユーザー名が記録されていれば LEAVE を組み立てる
        let Some(username) = session.username else {
            return Ok(None);
        };
        tracing::info!("User '{}' left (connection '{}')", username, id);

        let event = ChatMessageDto {
            content: Some(format!("{username} left")),
            sender: username,
            r#type: MessageType::Leave,
            timestamp: Some(current_clock_time()),
        };
        Ok(Some(
            Broadcast::to_public(self.repository.as_ref(), event).await,
        ))
    }
}
