//! Diet domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DietId, EventEnvelope, Timestamp, UserId};

/// Events emitted over a diet's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DietEvent {
    Created {
        diet_id: DietId,
        owner_id: UserId,
        nutritionist_id: UserId,
        expires_at: Timestamp,
        occurred_at: Timestamp,
    },

    /// A successor replaced `predecessor_id`, which is now superseded.
    Renewed {
        diet_id: DietId,
        predecessor_id: DietId,
        owner_id: UserId,
        expires_at: Timestamp,
        occurred_at: Timestamp,
    },

    Expired {
        diet_id: DietId,
        owner_id: UserId,
        occurred_at: Timestamp,
    },

    Paused {
        diet_id: DietId,
        by: UserId,
        occurred_at: Timestamp,
    },

    Reactivated {
        diet_id: DietId,
        by: UserId,
        occurred_at: Timestamp,
    },

    Reassigned {
        diet_id: DietId,
        previous_owner_id: UserId,
        new_owner_id: UserId,
        occurred_at: Timestamp,
    },
}

impl DietEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DietEvent::Created { .. } => "diet.created.v1",
            DietEvent::Renewed { .. } => "diet.renewed.v1",
            DietEvent::Expired { .. } => "diet.expired.v1",
            DietEvent::Paused { .. } => "diet.paused.v1",
            DietEvent::Reactivated { .. } => "diet.reactivated.v1",
            DietEvent::Reassigned { .. } => "diet.reassigned.v1",
        }
    }

    pub fn diet_id(&self) -> &DietId {
        match self {
            DietEvent::Created { diet_id, .. }
            | DietEvent::Renewed { diet_id, .. }
            | DietEvent::Expired { diet_id, .. }
            | DietEvent::Paused { diet_id, .. }
            | DietEvent::Reactivated { diet_id, .. }
            | DietEvent::Reassigned { diet_id, .. } => diet_id,
        }
    }

    pub fn occurred_at(&self) -> Timestamp {
        match self {
            DietEvent::Created { occurred_at, .. }
            | DietEvent::Renewed { occurred_at, .. }
            | DietEvent::Expired { occurred_at, .. }
            | DietEvent::Paused { occurred_at, .. }
            | DietEvent::Reactivated { occurred_at, .. }
            | DietEvent::Reassigned { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(
            self.event_type(),
            self.diet_id().to_string(),
            "Diet",
            self.occurred_at(),
            serde_json::to_value(self).unwrap_or_default(),
        )
    }
}
