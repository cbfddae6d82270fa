//! UseCase: 購読の登録と解除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubscribeUseCase::subscribe() / unsubscribe() メソッド
//!
//! ### なぜこのテストが必要か
//! - SUBSCRIBE した接続だけがチャネルの配信先になることを保証
//! - UNSUBSCRIBE 後は配信されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：購読と解除
//! - 異常系：未知の購読 ID の解除、切断済み接続での購読

use std::sync::Arc;

use crate::domain::{ConnectionId, SessionRepository, Subscription};

use super::error::UseCaseError;

/// 購読管理のユースケース
pub struct SubscribeUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl SubscribeUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// `destination` の購読を `subscription_id` で登録する
    pub async fn subscribe(
        &self,
        id: &ConnectionId,
        subscription_id: &str,
        destination: &str,
    ) -> Result<(), UseCaseError> {
        let subscription = Subscription {
            id: subscription_id.to_string(),
            destination: destination.to_string(),
        };
        self.repository.subscribe(id, subscription).await?;
        Ok(())
    }

    /// 購読を解除する。存在した場合は `true`
    pub async fn unsubscribe(
        &self,
        id: &ConnectionId,
        subscription_id: &str,
    ) -> Result<bool, UseCaseError> {
        Ok(self.repository.unsubscribe(id, subscription_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::infrastructure::repository::InMemorySessionRepository;

    async fn create_connected_repository(id: &str) -> Arc<InMemorySessionRepository> {
        let repository = Arc::new(InMemorySessionRepository::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        repository
            .add_session(ConnectionId::from(id), tx)
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_subscribe_makes_connection_a_recipient() {
        // テスト項目: 購読した接続が配信先になる
        // given (前提条件):
        let repository = create_connected_repository("c-1").await;
        let usecase = SubscribeUseCase::new(repository.clone());

        // when (操作):
        usecase
            .subscribe(&ConnectionId::from("c-1"), "sub-0", "/topic/public")
            .await
            .unwrap();

        // then (期待する結果):
        let recipients = repository.recipients("/topic/public").await;
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].subscription_id, "sub-0");
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        // テスト項目: 解除後は配信先から外れ、二度目の解除は false
        // given (前提条件):
        let repository = create_connected_repository("c-1").await;
        let usecase = SubscribeUseCase::new(repository.clone());
        let id = ConnectionId::from("c-1");
        usecase
            .subscribe(&id, "sub-0", "/topic/public")
            .await
            .unwrap();

        // when (操作):
        let first = usecase.unsubscribe(&id, "sub-0").await.unwrap();
        let second = usecase.unsubscribe(&id, "sub-0").await.unwrap();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(repository.recipients("/topic/public").await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_unknown_connection() {
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = SubscribeUseCase::new(repository);

        let result = usecase
            .subscribe(&ConnectionId::from("ghost"), "sub-0", "/topic/public")
            .await;

        assert_eq!(
            result,
            Err(UseCaseError::UnknownConnection("ghost".to_string()))
        );
    }
}
