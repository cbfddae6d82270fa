//! Broker-side session model.

use super::value_object::ConnectionId;

/// A SUBSCRIBE registration of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Client-chosen subscription id (`id` header)
    pub id: String,
    pub destination: String,
}

/// State of one connected STOMP session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: ConnectionId,
    /// Set by the first JOIN announcement on this connection
    pub username: Option<String>,
    pub subscriptions: Vec<Subscription>,
}

impl Session {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            username: None,
            subscriptions: Vec::new(),
        }
    }

    /// Register a subscription, replacing any earlier one with the same id
    pub fn subscribe(&mut self, subscription: Subscription) {
        self.subscriptions.retain(|s| s.id != subscription.id);
        self.subscriptions.push(subscription);
    }

    /// Remove a subscription by id. Returns whether it existed.
    pub fn unsubscribe(&mut self, subscription_id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != subscription_id);
        self.subscriptions.len() != before
    }

    /// Subscriptions of this session matching `destination`
    pub fn subscriptions_to<'a>(
        &'a self,
        destination: &'a str,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        self.subscriptions
            .iter()
            .filter(move |s| s.destination == destination)
    }
}
