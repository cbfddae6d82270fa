//! UseCase: チャットセッションの状態機械
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession::handle() による状態遷移（接続完了・切断・プロトコルエラー・受信フレーム）
//! - ChatSession::teardown() の冪等性
//!
//! ### なぜこのテストが必要か
//! - メッセージログが到着順を保つことを保証
//! - 再接続時に購読と JOIN 通知がやり直されることを確認
//! - 古いセッション（epoch）からの入力が状態を変更しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信イベントのログ追加、再接続
//! - 異常系：プロトコルエラー、不正なイベント本文
//! - エッジケース：leave 後に届いた古いコールバック、teardown の多重呼び出し

use std::fmt;

use agora_shared::dto::{ADD_USER_DESTINATION, PUBLIC_TOPIC};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatEvent, ClientEvent, EventHandler, FrameHandler, InboundFrame, MessageLog,
        ProtocolClient, SessionStatus, Username,
    },
    infrastructure::dto::{decode_event, encode_event},
};

/// プロトコルクライアントから届いた入力（セッション所有タスクで適用する）
#[derive(Debug)]
pub struct SessionInput {
    epoch: u64,
    kind: InputKind,
}

#[derive(Debug)]
enum InputKind {
    Client(ClientEvent),
    Frame(InboundFrame),
}

/// ユーザーに表示する通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 入力値が不正
    InputRejected { reason: String },
    /// 接続が切れた（自動で再接続する）
    ConnectionLost { reason: String },
    /// 再接続して購読をやり直した
    ConnectionRestored,
    /// 接続に失敗し、セッションを終了した
    ConnectionFailed { message: String },
    /// 受信したイベントを解釈できなかった
    MalformedEvent { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::InputRejected { reason } => write!(f, "{reason}"),
            Notice::ConnectionLost { reason } => {
                write!(f, "Connection lost ({reason}), reconnecting...")
            }
            Notice::ConnectionRestored => write!(f, "Connection restored"),
            Notice::ConnectionFailed { message } => write!(f, "Connection failed: {message}"),
            Notice::MalformedEvent { reason } => write!(f, "Ignored malformed event: {reason}"),
        }
    }
}

/// チャットセッション
///
/// セッション状態とメッセージログを所有し、状態遷移は全てこの構造体の
/// メソッドを通して行われる。
pub struct ChatSession<C: ProtocolClient> {
    pub(super) client: C,
    pub(super) status: SessionStatus,
    pub(super) username: Option<Username>,
    pub(super) log: MessageLog,
    pub(super) notices: Vec<Notice>,
    /// login / leave のたびに進める。古いコールバックからの入力を識別する。
    pub(super) epoch: u64,
    /// 現在の login で JOIN 済みか（以降の Connected は再接続）
    pub(super) joined: bool,
    pub(super) torn_down: bool,
    inputs: mpsc::UnboundedSender<SessionInput>,
}

impl<C: ProtocolClient> ChatSession<C> {
    /// 新しい ChatSession を作成
    ///
    /// 返される Receiver の入力は `handle()` に渡すこと。
    pub fn new(client: C) -> (Self, mpsc::UnboundedReceiver<SessionInput>) {
        let (inputs, receiver) = mpsc::unbounded_channel();
        let session = Self {
            client,
            status: SessionStatus::Disconnected,
            username: None,
            log: MessageLog::new(),
            notices: Vec::new(),
            epoch: 0,
            joined: false,
            torn_down: false,
            inputs,
        };
        (session, receiver)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// 溜まっている通知を取り出す
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// プロトコルクライアントからの入力を適用
    pub fn handle(&mut self, input: SessionInput) {
        if input.epoch != self.epoch || self.status == SessionStatus::Disconnected {
            tracing::debug!(
                "Dropping input of epoch {} (current {})",
                input.epoch,
                self.epoch
            );
            return;
        }

        match input.kind {
            InputKind::Client(ClientEvent::Connected) => self.on_connected(),
            InputKind::Client(ClientEvent::ConnectionLost { reason }) => {
                self.on_connection_lost(reason)
            }
            InputKind::Client(ClientEvent::ProtocolError { message }) => {
                self.on_protocol_error(message)
            }
            InputKind::Frame(frame) => self.on_frame(frame),
        }
    }

    /// プロセス終了時の後始末
    ///
    /// 状態に関わらず `disconnect()` を 1 回だけ呼ぶ。2 回目以降は何もしない。
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.client.disconnect();
        self.reset();
        tracing::debug!("Session torn down");
    }

    /// Disconnected に戻し、ユーザー名とログを破棄する
    pub(super) fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.status = SessionStatus::Disconnected;
        self.username = None;
        self.log.clear();
        self.joined = false;
    }

    pub(super) fn event_handler(&self) -> EventHandler {
        let inputs = self.inputs.clone();
        let epoch = self.epoch;
        Box::new(move |event| {
            let _ = inputs.send(SessionInput {
                epoch,
                kind: InputKind::Client(event),
            });
        })
    }

    fn frame_handler(&self) -> FrameHandler {
        let inputs = self.inputs.clone();
        let epoch = self.epoch;
        Box::new(move |frame| {
            let _ = inputs.send(SessionInput {
                epoch,
                kind: InputKind::Frame(frame),
            });
        })
    }

    fn on_connected(&mut self) {
        let Some(username) = self.username.clone() else {
            return;
        };

        // 購読は再接続をまたいで保持されないため、接続のたびに登録する
        let handler = self.frame_handler();
        if let Err(e) = self.client.subscribe(PUBLIC_TOPIC, handler) {
            tracing::warn!("Subscribe failed, waiting for the next connection: {}", e);
            return;
        }

        let body = match encode_event(&ChatEvent::join(&username)) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode JOIN event: {}", e);
                return;
            }
        };
        if let Err(e) = self.client.publish(ADD_USER_DESTINATION, &body) {
            tracing::warn!("JOIN not published, waiting for the next connection: {}", e);
            return;
        }

        self.status = SessionStatus::Connected;
        if self.joined {
            self.notices.push(Notice::ConnectionRestored);
        }
        self.joined = true;
        tracing::info!("User '{}' joined the public channel", username);
    }

    fn on_connection_lost(&mut self, reason: String) {
        if self.status != SessionStatus::Connected {
            tracing::debug!("Connection attempt failed: {}", reason);
            return;
        }
        tracing::warn!("Connection lost: {}", reason);
        self.status = SessionStatus::Connecting;
        self.notices.push(Notice::ConnectionLost { reason });
    }

    fn on_protocol_error(&mut self, message: String) {
        tracing::error!("Session ended by protocol error: {}", message);
        self.client.disconnect();
        self.reset();
        self.notices.push(Notice::ConnectionFailed { message });
    }

    fn on_frame(&mut self, frame: InboundFrame) {
        match decode_event(&frame.body) {
            Ok(event) => self.log.push(event),
            Err(e) => {
                tracing::warn!("Malformed chat event on '{}': {}", frame.destination, e);
                self.notices.push(Notice::MalformedEvent {
                    reason: e.to_string(),
                });
            }
        }
    }
}

impl<C: ProtocolClient> Drop for ChatSession<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
