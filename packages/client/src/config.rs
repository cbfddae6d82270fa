//! Client configuration and command-line arguments.

use std::time::Duration;

use agora_shared::stomp::HeartBeat;
use clap::Parser;

/// Broker endpoint used when none is given.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/ws-chat";

/// Fixed delay between reconnection attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Heart-beat period offered in both directions, in milliseconds.
pub const DEFAULT_HEARTBEAT_MS: u64 = 4000;

/// Time allowed for the transport to open and the broker to answer CONNECT.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection behavior of the chat client.
///
/// # Example
///
/// ```rust
/// use agora_client::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig {
///     endpoint: "ws://chat.example.com/ws-chat".to_string(),
///     max_reconnect_attempts: Some(10),
///     ..Default::default()
/// };
/// assert_eq!(config.reconnect_delay, Duration::from_millis(5000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Broker WebSocket endpoint (`http`, `https`, `ws` or `wss` URL).
    pub endpoint: String,

    /// Delay before each reconnection attempt.
    pub reconnect_delay: Duration,

    /// Give up after this many consecutive failed attempts. `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,

    /// Interval at which we offer to send heart-beats (zero disables).
    pub heartbeat_outgoing: Duration,

    /// Interval at which we ask to receive heart-beats (zero disables).
    pub heartbeat_incoming: Duration,

    /// Deadline for opening the transport and completing the handshake.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: None,
            heartbeat_outgoing: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            heartbeat_incoming: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Heart-beat offer sent in the CONNECT frame.
    pub fn heart_beat(&self) -> HeartBeat {
        HeartBeat::new(
            duration_millis(self.heartbeat_outgoing),
            duration_millis(self.heartbeat_incoming),
        )
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Command-line arguments of the `agora-client` binary.
#[derive(Debug, Parser)]
#[command(name = "agora-client", version, about = "Join the Agora public chat room")]
pub struct Args {
    /// Broker WebSocket endpoint
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Delay between reconnection attempts, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub reconnect_delay_ms: u64,

    /// Stop reconnecting after this many failed attempts (default: never)
    #[arg(long)]
    pub max_reconnect_attempts: Option<u32>,

    /// Heart-beat period in both directions, in milliseconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_HEARTBEAT_MS)]
    pub heartbeat_ms: u64,

    /// Handshake timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl From<&Args> for ClientConfig {
    fn from(args: &Args) -> Self {
        Self {
            endpoint: args.endpoint.clone(),
            reconnect_delay: Duration::from_millis(args.reconnect_delay_ms),
            max_reconnect_attempts: args.max_reconnect_attempts,
            heartbeat_outgoing: Duration::from_millis(args.heartbeat_ms),
            heartbeat_incoming: Duration::from_millis(args.heartbeat_ms),
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
        }
    }
}
