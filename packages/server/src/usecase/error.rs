//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::RepositoryError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UseCaseError {
    /// The connection is not registered (already gone or never added)
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    /// The connection id is already registered
    #[error("Connection already registered: {0}")]
    DuplicateConnection(String),
}

impl From<RepositoryError> for UseCaseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::SessionNotFound(id) => UseCaseError::UnknownConnection(id),
            RepositoryError::DuplicateSession(id) => UseCaseError::DuplicateConnection(id),
        }
    }
}
