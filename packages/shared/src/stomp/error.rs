//! STOMP codec error definitions.

use thiserror::Error;

/// Errors raised while decoding a STOMP frame or header value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The frame ended before the header block was terminated
    #[error("Incomplete frame: missing end of headers")]
    Incomplete,

    /// Unknown or unsupported command line
    #[error("Unknown STOMP command: {0}")]
    UnknownCommand(String),

    /// Header line without a ':' separator
    #[error("Malformed header line: {0}")]
    MalformedHeader(String),

    /// Escape sequence not defined by STOMP 1.2
    #[error("Invalid escape sequence in header: {0}")]
    InvalidEscape(String),

    /// content-length is not a number or does not fit the body
    #[error("Invalid content-length: {0}")]
    InvalidContentLength(String),

    /// Body is not terminated by a NUL octet
    #[error("Frame body is not NUL-terminated")]
    MissingNul,

    /// Non-EOL data after the terminating NUL
    #[error("Unexpected data after frame terminator")]
    TrailingData,

    /// heart-beat header is not "<cx>,<cy>"
    #[error("Invalid heart-beat header: {0}")]
    InvalidHeartBeat(String),
}
