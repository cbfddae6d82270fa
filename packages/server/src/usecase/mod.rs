//! UseCase 層
//!
//! ブローカーのビジネスロジックを実装するレイヤー。
//! UI 層（STOMP ハンドラ）から呼び出され、Domain 層を操作します。

pub mod add_user;
pub mod broadcast;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod send_message;
pub mod subscribe;

pub use add_user::AddUserUseCase;
pub use broadcast::Broadcast;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::UseCaseError;
pub use send_message::SendMessageUseCase;
pub use subscribe::SubscribeUseCase;
