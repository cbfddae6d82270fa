//! Repository trait（データアクセス層の抽象化）
//!
//! インフラ層がこの trait を実装し、UseCase 層はこの trait にのみ依存します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    entity::{Session, Subscription},
    error::RepositoryError,
    value_object::ConnectionId,
};

/// 配信先（購読 1 件分）
#[derive(Debug, Clone)]
pub struct Recipient {
    pub connection_id: ConnectionId,
    pub subscription_id: String,
    /// エンコード済み STOMP フレームの送信チャネル
    pub sender: UnboundedSender<String>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 新しい接続を登録
    async fn add_session(
        &self,
        id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<(), RepositoryError>;

    /// 接続を削除し、削除したセッションを返す
    async fn remove_session(&self, id: &ConnectionId) -> Result<Session, RepositoryError>;

    async fn get_session(&self, id: &ConnectionId) -> Result<Session, RepositoryError>;

    async fn subscribe(
        &self,
        id: &ConnectionId,
        subscription: Subscription,
    ) -> Result<(), RepositoryError>;

    async fn unsubscribe(
        &self,
        id: &ConnectionId,
        subscription_id: &str,
    ) -> Result<bool, RepositoryError>;

    async fn set_username(&self, id: &ConnectionId, username: String)
    -> Result<(), RepositoryError>;

    /// `destination` を購読している全ての配信先
    async fn recipients(&self, destination: &str) -> Vec<Recipient>;

    async fn count_sessions(&self) -> usize;
}
