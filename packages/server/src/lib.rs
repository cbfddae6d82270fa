//! Reference STOMP broker for the Agora chat client.
//!
//! Accepts websocket connections on `/ws-chat`, speaks STOMP 1.2 and fans
//! chat events out to every subscriber of `/topic/public`.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use ui::{WS_PATH, run, serve};
