//! Infrastructure layer: repository implementations and STOMP frame builders.

pub mod repository;
pub mod stomp;
