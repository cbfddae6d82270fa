//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ProtocolError, ValueObjectError};

/// セッション操作のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// 入力値が不正（ネットワーク操作前に拒否）
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    /// Connected 以外の状態でメッセージ送信しようとした
    #[error("Not connected to the chat room")]
    NotConnected,

    /// 既にセッションが開始されている
    #[error("Already logged in or connecting")]
    AlreadyActive,

    /// チャットイベントを JSON に変換できなかった
    #[error("Failed to encode chat event: {0}")]
    Encode(String),

    /// プロトコルクライアントが操作を拒否した
    #[error(transparent)]
    Protocol(ProtocolError),

    /// teardown 済みのセッションに対する操作
    #[error("Session has been shut down")]
    TornDown,
}

impl From<ProtocolError> for SessionError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::NotConnected => SessionError::NotConnected,
            ProtocolError::AlreadyActive => SessionError::AlreadyActive,
            other => SessionError::Protocol(other),
        }
    }
}
