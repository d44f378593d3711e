//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every handler reports failures as `EngagementError`.

mod engagement_guard;
pub mod handlers;

pub use engagement_guard::EngagementGuard;

use crate::domain::foundation::EventEnvelope;
use crate::ports::EventPublisher;

/// Publishes an event after the state change it describes is stored.
///
/// The write already happened, so a delivery failure is logged and dropped
/// rather than reported to the caller.
pub(crate) async fn publish_after_commit(publisher: &dyn EventPublisher, envelope: EventEnvelope) {
    let event_type = envelope.event_type.clone();
    let aggregate_id = envelope.aggregate_id.clone();
    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = %event_type,
            aggregate_id = %aggregate_id,
            error = %e,
            "Failed to publish event"
        );
    }
}

#[cfg(test)]
pub(crate) mod test_support;
