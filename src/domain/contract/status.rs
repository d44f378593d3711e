//! Contract status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a contract.
///
/// `Pending` and `Active` are open; at most one open contract exists per
/// (client, nutritionist) pair. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Created, awaiting a successful payment authorization.
    Pending,

    /// Paid and running until `ends_at`.
    Active,

    /// Duration elapsed.
    Completed,

    /// Withdrawn by the client.
    Cancelled,
}

impl ContractStatus {
    /// Open contracts block a second engagement for the same pair.
    pub fn is_open(&self) -> bool {
        matches!(self, ContractStatus::Pending | ContractStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "pending",
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContractStatus::Pending),
            "active" => Ok(ContractStatus::Active),
            "completed" => Ok(ContractStatus::Completed),
            "cancelled" => Ok(ContractStatus::Cancelled),
            other => Err(format!("unknown contract status: {}", other)),
        }
    }
}

impl StateMachine for ContractStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ContractStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Pending, Cancelled) | (Active, Cancelled) | (Active, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ContractStatus::*;
        match self {
            Pending => vec![Active, Cancelled],
            Active => vec![Completed, Cancelled],
            Completed | Cancelled => vec![],
        }
    }
}
