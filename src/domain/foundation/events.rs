//! Event envelope used to publish domain events.
//!
//! Aggregates describe what happened with plain enums (`ContractEvent`,
//! `DietEvent`); handlers wrap them in an `EventEnvelope` before handing them
//! to the `EventPublisher` port.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Unique identifier for events (used for deduplication).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried alongside an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// User who initiated the action that led to this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Transport envelope for domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,

    /// Event type for routing (e.g., "contract.activated.v1").
    pub event_type: String,

    /// Schema version number (extracted from event_type).
    pub schema_version: u32,

    pub aggregate_id: String,

    /// Type of aggregate ("Contract", "Diet").
    pub aggregate_type: String,

    pub occurred_at: Timestamp,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Creates a new EventEnvelope.
    ///
    /// The schema version is read from the `.vN` suffix of `event_type`,
    /// defaulting to 1.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        occurred_at: Timestamp,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        let schema_version = Self::extract_version(&event_type);

        Self {
            event_id: EventId::new(),
            event_type,
            schema_version,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at,
            payload,
            metadata: EventMetadata::default(),
        }
    }

    pub(crate) fn extract_version(event_type: &str) -> u32 {
        event_type
            .rsplit_once(".v")
            .and_then(|(_, version_str)| version_str.parse::<u32>().ok())
            .unwrap_or(1)
    }

    /// Add user ID for audit.
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(
            event_type,
            "agg-1",
            "Contract",
            Timestamp::now(),
            json!({"status": "active"}),
        )
    }

    #[test]
    fn version_is_read_from_event_type_suffix() {
        assert_eq!(envelope("contract.activated.v2").schema_version, 2);
        assert_eq!(envelope("contract.activated").schema_version, 1);
    }

    #[test]
    fn with_user_id_records_the_actor() {
        let env = envelope("diet.created.v1").with_user_id("u-1");
        assert_eq!(env.metadata.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn payload_as_reads_back_typed_payload() {
        #[derive(Deserialize)]
        struct Payload {
            status: String,
        }
        let payload: Payload = envelope("contract.activated.v1").payload_as().unwrap();
        assert_eq!(payload.status, "active");
    }

    #[test]
    fn empty_metadata_is_omitted_from_json() {
        let value = serde_json::to_value(envelope("x.v1")).unwrap();
        assert_eq!(value["metadata"], json!({}));
    }
}
