//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::domain::{
    ConnectionId, Recipient, RepositoryError, Session, SessionRepository, Subscription,
};

/// 接続中のクライアント情報
pub struct ClientInfo {
    /// Frame sender channel
    pub sender: UnboundedSender<String>,
    pub session: Session,
}

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    /// 接続中のクライアント情報（WebSocket sender を含む）
    connected_clients: Arc<Mutex<HashMap<ConnectionId, ClientInfo>>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_session(
        &self,
        id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<(), RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        if clients.contains_key(&id) {
            return Err(RepositoryError::DuplicateSession(id.to_string()));
        }
        clients.insert(
            id.clone(),
            ClientInfo {
                sender,
                session: Session::new(id),
            },
        );
        Ok(())
    }

    async fn remove_session(&self, id: &ConnectionId) -> Result<Session, RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        clients
            .remove(id)
            .map(|info| info.session)
            .ok_or_else(|| RepositoryError::SessionNotFound(id.to_string()))
    }

    async fn get_session(&self, id: &ConnectionId) -> Result<Session, RepositoryError> {
        let clients = self.connected_clients.lock().await;
        clients
            .get(id)
            .map(|info| info.session.clone())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.to_string()))
    }

    async fn subscribe(
        &self,
        id: &ConnectionId,
        subscription: Subscription,
    ) -> Result<(), RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        let info = clients
            .get_mut(id)
            .ok_or_else(|| RepositoryError::SessionNotFound(id.to_string()))?;
        info.session.subscribe(subscription);
        Ok(())
    }

    async fn unsubscribe(
        &self,
        id: &ConnectionId,
        subscription_id: &str,
    ) -> Result<bool, RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        let info = clients
            .get_mut(id)
            .ok_or_else(|| RepositoryError::SessionNotFound(id.to_string()))?;
        Ok(info.session.unsubscribe(subscription_id))
    }

    async fn set_username(
        &self,
        id: &ConnectionId,
        username: String,
    ) -> Result<(), RepositoryError> {
        let mut clients = self.connected_clients.lock().await;
        let info = clients
            .get_mut(id)
            .ok_or_else(|| RepositoryError::SessionNotFound(id.to_string()))?;
        info.session.username = Some(username);
        Ok(())
    }

    async fn recipients(&self, destination: &str) -> Vec<Recipient> {
        let clients = self.connected_clients.lock().await;
        clients
            .values()
            .flat_map(|info| {
                info.session
                    .subscriptions_to(destination)
                    .map(|subscription| Recipient {
                        connection_id: info.session.id.clone(),
                        subscription_id: subscription.id.clone(),
                        sender: info.sender.clone(),
                    })
            })
            .collect()
    }

    async fn count_sessions(&self) -> usize {
        let clients = self.connected_clients.lock().await;
        clients.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn create_test_repository() -> InMemorySessionRepository {
        InMemorySessionRepository::new()
    }

    fn public(id: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            destination: "/topic/public".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_session_success() {
        // テスト項目: 接続を登録できる
        // given (前提条件):
        let repo = create_test_repository();
        let (sender, _receiver) = mpsc::unbounded_channel();

        // when (操作):
        let result = repo.add_session(ConnectionId::from("c-1"), sender).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(repo.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_add_session_duplicate() {
        // テスト項目: 同じ ID の接続は登録できない
        // given (前提条件):
        let repo = create_test_repository();
        let (sender1, _receiver1) = mpsc::unbounded_channel();
        let (sender2, _receiver2) = mpsc::unbounded_channel();
        repo.add_session(ConnectionId::from("c-1"), sender1)
            .await
            .unwrap();

        // when (操作):
        let result = repo.add_session(ConnectionId::from("c-1"), sender2).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::DuplicateSession("c-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remove_session_returns_state() {
        // テスト項目: 削除したセッションのユーザー名を取得できる
        // given (前提条件):
        let repo = create_test_repository();
        let (sender, _receiver) = mpsc::unbounded_channel();
        let id = ConnectionId::from("c-1");
        repo.add_session(id.clone(), sender).await.unwrap();
        repo.set_username(&id, "Alice".to_string()).await.unwrap();

        // when (操作):
        let session = repo.remove_session(&id).await.unwrap();

        // then (期待する結果):
        assert_eq!(session.username.as_deref(), Some("Alice"));
        assert_eq!(repo.count_sessions().await, 0);
        assert!(matches!(
            repo.remove_session(&id).await,
            Err(RepositoryError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_recipients_by_destination() {
        // テスト項目: 宛先を購読している接続だけが配信先になる
        // given (前提条件):
        let repo = create_test_repository();
        let (sender1, _receiver1) = mpsc::unbounded_channel();
        let (sender2, _receiver2) = mpsc::unbounded_channel();
        let alice = ConnectionId::from("alice");
        let bob = ConnectionId::from("bob");
        repo.add_session(alice.clone(), sender1).await.unwrap();
        repo.add_session(bob.clone(), sender2).await.unwrap();
        repo.subscribe(&alice, public("sub-0")).await.unwrap();
        repo.subscribe(
            &bob,
            Subscription {
                id: "sub-0".to_string(),
                destination: "/topic/other".to_string(),
            },
        )
        .await
        .unwrap();

        // when (操作):
        let recipients = repo.recipients("/topic/public").await;

        // then (期待する結果):
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].connection_id, alice);
        assert_eq!(recipients[0].subscription_id, "sub-0");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let repo = create_test_repository();
        let (sender, _receiver) = mpsc::unbounded_channel();
        let id = ConnectionId::from("c-1");
        repo.add_session(id.clone(), sender).await.unwrap();
        repo.subscribe(&id, public("sub-0")).await.unwrap();

        assert!(repo.unsubscribe(&id, "sub-0").await.unwrap());

        assert!(repo.recipients("/topic/public").await.is_empty());
    }

    #[tokio::test]
    async fn test_operations_on_unknown_session() {
        let repo = create_test_repository();
        let id = ConnectionId::from("ghost");

        assert!(repo.subscribe(&id, public("sub-0")).await.is_err());
        assert!(repo.unsubscribe(&id, "sub-0").await.is_err());
        assert!(repo.set_username(&id, "x".to_string()).await.is_err());
        assert!(repo.get_session(&id).await.is_err());
    }
}
