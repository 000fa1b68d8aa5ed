//! Event bus backed by a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use boardstorm_core::types::DbId;

// ---------------------------------------------------------------------------
// WorkshopEvent
// ---------------------------------------------------------------------------

/// What changed. Serialized snake_case, e.g. `"note_created"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NoteCreated,
    NoteMoved,
    NoteDeleted,
    ParticipantJoined,
    ParticipantDeleted,
    BoardAdvanced,
    TimerUpdated,
    AnalysisCreated,
    AnalysisDeleted,
    WorkshopUpdated,
}

/// A change notification for one workshop.
///
/// Carries enough payload for a facilitator client to refresh the affected
/// slice of its view without another round trip for the common cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopEvent {
    /// The workshop whose state changed. WebSocket forwarding filters on
    /// this field.
    pub workshop_id: DbId,
    pub kind: EventKind,
    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,
    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl WorkshopEvent {
    /// Create an event with an empty payload.
    pub fn new(workshop_id: DbId, kind: EventKind) -> Self {
        Self {
            workshop_id,
            kind,
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
/// independently receive every published [`WorkshopEvent`]. Designed to be
/// shared via `Arc<EventBus>` across the application.
pub struct EventBus {
    sender: broadcast::Sender<WorkshopEvent>,
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
    /// If there are no active subscribers the event is silently dropped;
    /// persisted state is the source of truth, the bus only accelerates
    /// facilitator refresh.
    pub fn publish(&self, event: WorkshopEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkshopEvent> {
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
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = WorkshopEvent::new(42, EventKind::NoteCreated)
            .with_payload(serde_json::json!({"note_id": 7}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.workshop_id, 42);
        assert_eq!(received.kind, EventKind::NoteCreated);
        assert_eq!(received.payload["note_id"], 7);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(WorkshopEvent::new(1, EventKind::BoardAdvanced));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.kind, EventKind::BoardAdvanced);
        assert_eq!(e2.kind, EventKind::BoardAdvanced);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(WorkshopEvent::new(9, EventKind::TimerUpdated));
    }

    #[test]
    fn event_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::ParticipantJoined).unwrap();
        assert_eq!(json, "\"participant_joined\"");
    }
}
