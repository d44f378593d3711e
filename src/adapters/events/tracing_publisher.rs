//! Publisher that writes each event to the structured log.
//!
//! Default sink for the server binary; a broker-backed publisher can replace
//! it without touching handlers.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            user_id = event.metadata.user_id.as_deref().unwrap_or("-"),
            payload = %event.payload,
            "domain event"
        );
        Ok(())
    }
}
