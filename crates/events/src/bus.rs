//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ContentEvent`]s and is
//! shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use folio_core::restore::RestoreOutcome;
use folio_core::revision::Revision;
use folio_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const REVISION_RECORDED: &str = "revision.recorded";
pub const REVISION_RESTORED: &str = "revision.restored";
pub const REVISION_RESTORE_FAILED: &str = "revision.restore_failed";

// ---------------------------------------------------------------------------
// ContentEvent
// ---------------------------------------------------------------------------

/// Something that happened to a post's revision history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEvent {
    /// Dot-separated event name, e.g. `"revision.restored"`.
    pub event_type: String,
    pub post_id: DbId,
    /// Version the event is about, when there is one.
    pub version: Option<i32>,
    /// User whose action triggered the event.
    pub actor_user_id: Option<DbId>,
    /// Event-specific details.
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ContentEvent {
    pub fn new(event_type: impl Into<String>, post_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            post_id,
            version: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// A revision was appended to a post's history.
    pub fn revision_recorded(revision: &Revision) -> Self {
        Self::new(REVISION_RECORDED, revision.post_id)
            .with_version(revision.version)
            .with_actor(revision.edited_by.id)
            .with_payload(serde_json::json!({
                "kind": revision.kind,
                "changes_summary": revision.changes_summary,
            }))
    }

    /// A post was restored to an earlier version.
    pub fn revision_restored(post_id: DbId, outcome: &RestoreOutcome) -> Self {
        Self::new(REVISION_RESTORED, post_id)
            .with_version(outcome.revision.version)
            .with_actor(outcome.revision.edited_by.id)
            .with_payload(serde_json::json!({
                "restored_from": outcome.restored_from,
                "safety_version": outcome.safety_revision.as_ref().map(|r| r.version),
            }))
    }

    /// A restore attempt failed; the user should be told to retry.
    pub fn restore_failed(post_id: DbId, target_version: i32, actor: DbId, error: &str) -> Self {
        Self::new(REVISION_RESTORE_FAILED, post_id)
            .with_version(target_version)
            .with_actor(actor)
            .with_payload(serde_json::json!({ "error": error }))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<ContentEvent>,
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
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: ContentEvent) {
        let event_type = event.event_type.clone();
        if self.sender.send(event).is_err() {
            tracing::trace!(%event_type, "No subscribers for event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
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
    use folio_core::revision::{Editor, PendingRevision, RevisionDiff, RevisionKind};
    use folio_core::snapshot::Snapshot;

    use super::*;

    fn revision(version: i32, summary: &str) -> Revision {
        PendingRevision {
            post_id: 10,
            version,
            snapshot: Snapshot::default(),
            edited_by: Editor {
                id: 3,
                name: "Hedy".into(),
                email: "hedy@example.com".into(),
            },
            kind: RevisionKind::Manual,
            changes_summary: summary.into(),
            diff: RevisionDiff::default(),
            created_at: Utc::now(),
        }
        .into_revision(100 + version as i64)
    }

    #[tokio::test]
    async fn restored_event_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let outcome = RestoreOutcome {
            snapshot: Snapshot::default(),
            revision: revision(5, "Restored to version 2"),
            safety_revision: Some(revision(4, "Restored to version 2")),
            restored_from: 2,
        };
        bus.publish(ContentEvent::revision_restored(10, &outcome));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, REVISION_RESTORED);
        assert_eq!(received.post_id, 10);
        assert_eq!(received.version, Some(5));
        assert_eq!(received.actor_user_id, Some(3));
        assert_eq!(received.payload["restored_from"], 2);
        assert_eq!(received.payload["safety_version"], 4);
    }

    #[tokio::test]
    async fn every_subscriber_receives_recorded_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ContentEvent::revision_recorded(&revision(1, "Initial version")));

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.event_type, REVISION_RECORDED);
        assert_eq!(e2.payload["changes_summary"], "Initial version");
        assert_eq!(e2.payload["kind"], "manual");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(ContentEvent::restore_failed(1, 2, 3, "Storage error: timeout"));
    }

    #[test]
    fn bare_event_has_empty_optional_fields() {
        let event = ContentEvent::new("revision.viewed", 8);
        assert!(event.version.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
