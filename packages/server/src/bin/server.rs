//! Agora reference broker.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server -- --port 8080
//! ```

use std::net::{IpAddr, SocketAddr};

use agora_shared::{logger::setup_logger, stomp::HeartBeat};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "agora-server", version, about = "STOMP over WebSocket chat broker")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// heart-beat period offered to clients in milliseconds (0 disables)
    #[arg(long, default_value_t = 4000)]
    heartbeat_ms: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    let heart_beat = HeartBeat::new(args.heartbeat_ms, args.heartbeat_ms);
    if let Err(e) = agora_server::run(SocketAddr::new(args.host, args.port), heart_beat).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
