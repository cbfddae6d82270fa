//! Logger setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, the binary's own crate and the
/// shared crate log at `default_level`; everything else stays at `warn`.
///
/// # Arguments
///
/// * `bin_name` - Binary name, usually `env!("CARGO_BIN_NAME")`
/// * `default_level` - Level used when `RUST_LOG` is not set (e.g. "debug")
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_target = bin_name.replace('-', "_");
    let default_directive = format!("warn,{crate_target}={default_level},agora_shared={default_level}");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Writing to stderr keeps stdout free for the chat transcript.
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("logger already initialized: {e}");
    }
}
