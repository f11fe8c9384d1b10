//! Audit trail for revision events.
//!
//! [`AuditLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes one structured log line per [`ContentEvent`]. It runs as a
//! long-lived background task and exits when the bus is dropped.

use tokio::sync::broadcast;

use crate::bus::{ContentEvent, REVISION_RESTORE_FAILED};

pub struct AuditLog;

impl AuditLog {
    /// Run the audit loop until the channel closes.
    ///
    /// Returns the number of events logged.
    pub async fn run(mut receiver: broadcast::Receiver<ContentEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::record(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Audit log lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(logged, "Event bus closed, audit log shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn record(event: &ContentEvent) {
        if event.event_type == REVISION_RESTORE_FAILED {
            tracing::warn!(
                event_type = %event.event_type,
                post_id = event.post_id,
                version = ?event.version,
                user_id = ?event.actor_user_id,
                payload = %event.payload,
                "Content event"
            );
        } else {
            tracing::info!(
                event_type = %event.event_type,
                post_id = event.post_id,
                version = ?event.version,
                user_id = ?event.actor_user_id,
                payload = %event.payload,
                "Content event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn logs_until_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(AuditLog::run(bus.subscribe()));

        bus.publish(ContentEvent::new("revision.recorded", 1).with_version(1));
        bus.publish(ContentEvent::restore_failed(1, 1, 2, "Storage error"));
        drop(bus);

        assert_eq!(handle.await.unwrap(), 2);
    }
}
