//! Append-only log of received chat events.

use super::entity::ChatEvent;

/// Chat events in arrival order.
///
/// The log never reorders or deduplicates: duplicates and out-of-order
/// timestamps from the broker are kept exactly as delivered. The only
/// mutation besides `push` is clearing the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    events: Vec<ChatEvent>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the end of the log.
    pub fn push(&mut self, event: ChatEvent) {
        self.events.push(event);
    }

    /// Drop every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[ChatEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ChatEvent> {
        self.events.last()
    }
}
