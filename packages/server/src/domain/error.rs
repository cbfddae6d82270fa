//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Repository operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session id already registered
    #[error("Session already registered: {0}")]
    DuplicateSession(String),
}
