//! Domain layer for the broker.
//!
//! This module contains the session model and the repository seam. It is
//! independent of the STOMP codec and of axum.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{Session, Subscription};
pub use error::RepositoryError;
pub use repository::{Recipient, SessionRepository};
pub use value_object::ConnectionId;
