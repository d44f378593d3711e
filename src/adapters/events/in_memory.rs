//! In-memory event bus.
//!
//! Records every published envelope for assertions. Used by tests and by
//! the server when no broker is configured.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus.
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("contract.initiated.v1"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
    fail_publish: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<EventEnvelope>> {
        self.published.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<EventEnvelope>> {
        self.published.write().unwrap_or_else(|e| e.into_inner())
    }

    // === Test Helpers ===

    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.read().clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.read()
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.read().len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.read().iter().any(|e| e.event_type == event_type)
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                "event bus unavailable",
            ));
        }
        self.write().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(
            event_type,
            aggregate_id,
            "Contract",
            Timestamp::now(),
            serde_json::json!({}),
        )
    }

    #[tokio::test]
    async fn records_published_events_in_order() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("contract.initiated.v1", "c1")).await.unwrap();
        bus.publish(envelope("contract.activated.v1", "c1")).await.unwrap();
        bus.publish(envelope("contract.initiated.v1", "c2")).await.unwrap();

        assert_eq!(bus.event_count(), 3);
        assert_eq!(bus.published_events()[2].aggregate_id, "c2");
        assert_eq!(bus.events_of_type("contract.initiated.v1").len(), 2);
        let for_c1 = bus.events_for_aggregate("c1");
        assert_eq!(for_c1[1].event_type, "contract.activated.v1");
        assert!(bus.has_event("contract.activated.v1"));

        bus.clear();
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn failing_bus_records_nothing() {
        let bus = InMemoryEventBus::new();
        bus.set_fail_publish(true);
        assert!(bus.publish(envelope("diet.created.v1", "d1")).await.is_err());
        assert_eq!(bus.event_count(), 0);
    }
}
