//! Minimal STOMP 1.2 codec for one-frame-per-WebSocket-message transports.

pub mod error;
pub mod frame;
pub mod heartbeat;

pub use error::FrameError;
pub use frame::{Command, Frame, HEARTBEAT, WireMessage, decode_message};
pub use heartbeat::{HeartBeat, NegotiatedHeartBeat};

/// Protocol version spoken by both ends.
pub const STOMP_VERSION: &str = "1.2";
