//! UseCase: チャットメッセージ配信（/app/chat.sendMessage）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - タイムスタンプの付与と配信先の選定
//!
//! ### なぜこのテストが必要か
//! - 送信者自身も含めた全購読者にエコーされることを保証（クライアントは楽観的に表示しない）
//! - サーバー時刻でタイムスタンプが上書きされることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：購読者全員への配信
//! - エッジケース：購読者がいない場合、クライアントが timestamp を付けて送った場合

use std::sync::Arc;

use agora_shared::{dto::ChatMessageDto, time::current_clock_time};

use crate::domain::SessionRepository;

use super::broadcast::Broadcast;

/// メッセージ配信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// メッセージにサーバー時刻を付与し、配信先を選定する
    pub async fn execute(&self, mut message: ChatMessageDto) -> Broadcast {
        message.timestamp = Some(current_clock_time());
        Broadcast::to_public(self.repository.as_ref(), message).await
    }
}
