//! Session status of the chat client.

use std::fmt;

/// Connection status as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session; the initial state and the state after leaving.
    #[default]
    Disconnected,

    /// Login submitted (or connection lost) and waiting for the handshake.
    Connecting,

    /// Handshake done, subscribed to the public channel and JOIN published.
    Connected,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
        };
        f.write_str(label)
    }
}
