//! Terminal chat client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-client -- --endpoint http://localhost:8080/ws-chat
//! ```

use agora_client::config::{Args, ClientConfig};
use agora_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ClientConfig::from(&args);
    if let Err(e) = agora_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
