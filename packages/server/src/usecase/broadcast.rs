//! Fan-out result shared by the publishing use cases.

use agora_shared::dto::{ChatMessageDto, PUBLIC_TOPIC};

use crate::domain::{Recipient, SessionRepository};

/// A chat event and the subscriptions it has to be delivered to.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub destination: &'static str,
    pub event: ChatMessageDto,
    pub recipients: Vec<Recipient>,
}

impl Broadcast {
    /// Resolve the current `/topic/public` subscribers for `event`.
    pub(super) async fn to_public(repository: &dyn SessionRepository, event: ChatMessageDto) -> Self {
        let recipients = repository.recipients(PUBLIC_TOPIC).await;
        Self {
            destination: PUBLIC_TOPIC,
            event,
            recipients,
        }
    }
}
