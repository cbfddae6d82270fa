//! Shared utilities for the Agora chat application.
//!
//! Both the client and the reference broker speak STOMP 1.2 over WebSocket and
//! exchange the same chat JSON payloads; the codec and DTOs live here.

pub mod dto;
pub mod logger;
pub mod stomp;
pub mod time;
