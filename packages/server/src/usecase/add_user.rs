//! UseCase: 参加通知（/app/chat.addUser）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AddUserUseCase::execute() メソッド
//! - ユーザー名の記録と JOIN イベントの生成
//!
//! ### なぜこのテストが必要か
//! - 切断時の LEAVE 通知のためにユーザー名が接続に記録される必要がある
//! - クライアントが送った type や content に関係なく JOIN として配信されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：JOIN 通知が購読者全員（送信者を含む）に配信される
//! - エッジケース：type や content が付いた参加通知
//! - 異常系：切断済みの接続からの参加通知

use std::sync::Arc;

use agora_shared::{
    dto::{ChatMessageDto, MessageType},
    time::current_clock_time,
};

use crate::domain::{ConnectionId, SessionRepository};

use super::{broadcast::Broadcast, error::UseCaseError};

/// 参加通知のユースケース
pub struct AddUserUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl AddUserUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 送信者を接続のユーザー名として記録し、JOIN イベントを組み立てる
    ///
    /// # Returns
    ///
    /// * `Ok(Broadcast)` - `/topic/public` に配信する JOIN イベントと配信先
    pub async fn execute(
        &self,
        id: &ConnectionId,
        announcement: ChatMessageDto,
    ) -> Result<Broadcast, UseCaseError> {
        let sender = announcement.sender;
        self.repository.set_username(id, sender.clone()).await?;

        tracing::info!("User '{}' joined on connection '{}'", sender, id);

        let event = ChatMessageDto {
            content: Some(format!("{sender} joined")),
            sender,
            r#type: MessageType::Join,
            timestamp: Some(current_clock_time()),
        };
        Ok(Broadcast::to_public(self.repository.as_ref(), event).await)
    }
}

#[cfg(test)]
mod tests {
    use agora_shared::dto::PUBLIC_TOPIC;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{domain::Subscription, infrastructure::repository::InMemorySessionRepository};

    async fn create_subscribed_repository(ids: &[&str]) -> Arc<InMemorySessionRepository> {
        let repository = Arc::new(InMemorySessionRepository::new());
        for id in ids {
            let (tx, _rx) = mpsc::unbounded_channel();
            let id = ConnectionId::from(*id);
            repository.add_session(id.clone(), tx).await.unwrap();
            repository
                .subscribe(
                    &id,
                    Subscription {
                        id: "sub-0".to_string(),
                        destination: PUBLIC_TOPIC.to_string(),
                    },
                )
                .await
                .unwrap();
        }
        repository
    }

    fn announcement(sender: &str) -> ChatMessageDto {
        ChatMessageDto {
            sender: sender.to_string(),
            content: None,
            r#type: MessageType::Join,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_add_user_records_username_and_builds_join() {
        // テスト項目: ユーザー名が記録され、JOIN イベントが全購読者に配信される
        // given (前提条件):
        let repository = create_subscribed_repository(&["alice", "bob"]).await;
        let usecase = AddUserUseCase::new(repository.clone());
        let id = ConnectionId::from("alice");

        // when (操作):
        let broadcast = usecase.execute(&id, announcement("Alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(broadcast.destination, PUBLIC_TOPIC);
        assert_eq!(broadcast.event.sender, "Alice");
        assert_eq!(broadcast.event.r#type, MessageType::Join);
        assert_eq!(broadcast.event.content.as_deref(), Some("Alice joined"));
        assert!(broadcast.event.timestamp.is_some());
        assert_eq!(broadcast.recipients.len(), 2);

        let session = repository.get_session(&id).await.unwrap();
        assert_eq!(session.username.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_add_user_forces_join_type_and_content() {
        // テスト項目: 送信された type と content は上書きされる
        // given (前提条件):
        let repository = create_subscribed_repository(&["alice"]).await;
        let usecase = AddUserUseCase::new(repository);
        let mut dto = announcement("Alice");
        dto.r#type = MessageType::Chat;
        dto.content = Some("hi".to_string());

        // when (操作):
        let broadcast = usecase
            .execute(&ConnectionId::from("alice"), dto)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(broadcast.event.r#type, MessageType::Join);
        assert_eq!(broadcast.event.content.as_deref(), Some("Alice joined"));
    }

    #[tokio::test]
    async fn test_add_user_unknown_connection() {
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = AddUserUseCase::new(repository);

        let result = usecase
            .execute(&ConnectionId::from("ghost"), announcement("Alice"))
            .await;

        assert!(matches!(result, Err(UseCaseError::UnknownConnection(_))));
    }
}
