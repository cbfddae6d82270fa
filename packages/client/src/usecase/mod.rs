//! UseCase 層
//!
//! チャットセッションの状態遷移（Disconnected / Connecting / Connected）を実装するレイヤー。
//! UI 層から呼び出され、Domain 層の `ProtocolClient` を操作します。
//!
//! プロトコルクライアントのコールバックは `SessionInput` としてチャネルに送られ、
//! セッションを所有するタスクが `ChatSession::handle` で適用します。

pub mod error;
pub mod leave;
pub mod login;
pub mod send_message;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::SessionError;
pub use session::{ChatSession, Notice, SessionInput};
