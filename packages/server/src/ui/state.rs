//! Server state shared by the handlers.

use std::sync::Arc;

use agora_shared::stomp::HeartBeat;

use crate::{domain::SessionRepository, infrastructure::stomp::SERVER_HEART_BEAT};

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn SessionRepository>,
    /// heart-beat offered in every CONNECTED frame
    pub heart_beat: HeartBeat,
}

impl AppState {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            repository,
            heart_beat: SERVER_HEART_BEAT,
        }
    }

    pub fn with_heart_beat(mut self, heart_beat: HeartBeat) -> Self {
        self.heart_beat = heart_beat;
        self
    }
}
