//! STOMP-over-WebSocket broker implementation.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{WS_PATH, run, serve};
