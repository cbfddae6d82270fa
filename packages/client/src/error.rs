//! Errors returned by the client entry point.

use thiserror::Error;

use crate::infrastructure::TransportError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint could not be used
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Terminal I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
