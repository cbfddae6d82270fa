//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username is empty after trimming
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// MessageContent is empty after trimming
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors raised when a received chat event violates the event invariants
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatEventError {
    /// Sender is empty
    #[error("Chat event sender cannot be empty")]
    SenderEmpty,

    /// Sender too long error
    #[error("Chat event sender cannot exceed {max} characters (got {actual})")]
    SenderTooLong { max: usize, actual: usize },

    /// CHAT events must carry content
    #[error("Chat message content cannot be empty")]
    ContentEmpty,

    /// Content too long error
    #[error("Chat event content cannot exceed {max} characters (got {actual})")]
    ContentTooLong { max: usize, actual: usize },

    /// Body is not a chat event JSON document
    #[error("Malformed chat event payload: {0}")]
    Malformed(String),
}

/// Errors surfaced by the protocol client seam
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Publish or subscribe attempted while the handshake has not completed
    #[error("Not connected to the broker")]
    NotConnected,

    /// connect() called while a connection is already being maintained
    #[error("A broker connection is already active")]
    AlreadyActive,

    /// No async runtime available to drive the connection
    #[error("Cannot start connection task: {0}")]
    Runtime(String),
}
