//! Agora chat client library.
//!
//! Layers, from the inside out:
//! - `domain`: chat events, message log, session status and the
//!   `ProtocolClient` seam
//! - `infrastructure`: websocket transport and the STOMP client
//! - `usecase`: the chat session state machine
//! - `ui`: the terminal front end

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use ui::run as run_client;
