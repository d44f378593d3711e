//! Contract domain events.
//!
//! Every contract state change emits exactly one event.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContractId, EventEnvelope, Timestamp, UserId};

use super::Money;

/// Events emitted over a contract's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractEvent {
    /// A pending contract was created and a payment authorization requested.
    Initiated {
        contract_id: ContractId,
        client_id: UserId,
        nutritionist_id: UserId,
        amount: Money,
        duration_months: i64,
        payment_authorization_id: String,
        occurred_at: Timestamp,
    },

    /// Payment was reconciled. Pending → Active.
    Activated {
        contract_id: ContractId,
        client_id: UserId,
        nutritionist_id: UserId,
        starts_at: Timestamp,
        ends_at: Timestamp,
        occurred_at: Timestamp,
    },

    /// Client withdrew. Pending/Active → Cancelled.
    Cancelled {
        contract_id: ContractId,
        client_id: UserId,
        nutritionist_id: UserId,
        was_active: bool,
        occurred_at: Timestamp,
    },

    /// Period ended. Active → Completed.
    Completed {
        contract_id: ContractId,
        client_id: UserId,
        nutritionist_id: UserId,
        occurred_at: Timestamp,
    },
}

impl ContractEvent {
    /// Returns the event type string for routing and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            ContractEvent::Initiated { .. } => "contract.initiated.v1",
            ContractEvent::Activated { .. } => "contract.activated.v1",
            ContractEvent::Cancelled { .. } => "contract.cancelled.v1",
            ContractEvent::Completed { .. } => "contract.completed.v1",
        }
    }

    pub fn contract_id(&self) -> &ContractId {
        match self {
            ContractEvent::Initiated { contract_id, .. }
            | ContractEvent::Activated { contract_id, .. }
            | ContractEvent::Cancelled { contract_id, .. }
            | ContractEvent::Completed { contract_id, .. } => contract_id,
        }
    }

    pub fn occurred_at(&self) -> Timestamp {
        match self {
            ContractEvent::Initiated { occurred_at, .. }
            | ContractEvent::Activated { occurred_at, .. }
            | ContractEvent::Cancelled { occurred_at, .. }
            | ContractEvent::Completed { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps the event for publishing.
    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(
            self.event_type(),
            self.contract_id().to_string(),
            "Contract",
            self.occurred_at(),
            serde_json::to_value(self).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_type_and_aggregate() {
        let contract_id = ContractId::new();
        let event = ContractEvent::Completed {
            contract_id,
            client_id: UserId::new(),
            nutritionist_id: UserId::new(),
            occurred_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();
        assert_eq!(envelope.event_type, "contract.completed.v1");
        assert_eq!(envelope.aggregate_id, contract_id.to_string());
        assert_eq!(envelope.aggregate_type, "Contract");
        assert_eq!(envelope.payload["type"], "completed");
        assert_eq!(envelope.payload_as::<ContractEvent>().unwrap(), event);
    }
}
