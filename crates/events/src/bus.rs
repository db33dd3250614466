//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DraftEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use riftdraft_core::types::DbId;

// ---------------------------------------------------------------------------
// DraftEvent
// ---------------------------------------------------------------------------

/// A domain event scoped to one draft session.
///
/// Constructed via [`DraftEvent::new`] and enriched with
/// [`with_payload`](DraftEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEvent {
    /// Dot-separated event name, e.g. `"game.action_submitted"`.
    pub event_type: String,

    /// The session this event belongs to. Fan-out is session-scoped.
    pub session_id: DbId,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DraftEvent {
    /// Create a new event with an empty payload.
    pub fn new(event_type: impl Into<String>, session_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            session_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DraftEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DraftEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DraftEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Create a new subscription receiving all events published from this
    /// point on.
    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DraftEvent::new("session.updated", 42));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "session.updated");
        assert_eq!(event.session_id, 42);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(DraftEvent::new("session.updated", 1));
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(DraftEvent::new("chat.message", 7).with_payload(serde_json::json!({
            "message_id": 1,
        })));

        assert_eq!(a.recv().await.unwrap().session_id, 7);
        assert_eq!(b.recv().await.unwrap().session_id, 7);
    }
}
