//! Diet status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Stored lifecycle state of a diet.
///
/// Whether an `Active` diet has run past its window is derived from the clock
/// (see `DietStatusView`); `Expired` is only written by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietStatus {
    Active,
    Expired,
    /// Replaced by a renewal; the successor points back here.
    Superseded,
    Paused,
}

impl DietStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietStatus::Active => "active",
            DietStatus::Expired => "expired",
            DietStatus::Superseded => "superseded",
            DietStatus::Paused => "paused",
        }
    }

    /// States a renewal may start from.
    pub fn is_renewable(&self) -> bool {
        self.can_transition_to(&DietStatus::Superseded)
    }
}

impl std::fmt::Display for DietStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DietStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DietStatus::Active),
            "expired" => Ok(DietStatus::Expired),
            "superseded" => Ok(DietStatus::Superseded),
            "paused" => Ok(DietStatus::Paused),
            other => Err(format!("unknown diet status: {}", other)),
        }
    }
}

impl StateMachine for DietStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DietStatus::*;
        matches!(
            (self, target),
            (Active, Expired)
                | (Active, Superseded)
                | (Active, Paused)
                | (Paused, Active)
                // renewal of a plan that already lapsed or was put on hold
                | (Expired, Superseded)
                | (Paused, Superseded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DietStatus::*;
        match self {
            Active => vec![Expired, Superseded, Paused],
            Paused => vec![Active, Superseded],
            Expired => vec![Superseded],
            Superseded => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_superseded_is_terminal() {
        assert!(DietStatus::Superseded.is_terminal());
        for status in [DietStatus::Active, DietStatus::Expired, DietStatus::Paused] {
            assert!(!status.is_terminal(), "{:?}", status);
        }
    }

    #[test]
    fn pause_round_trip_is_allowed() {
        assert!(DietStatus::Active.can_transition_to(&DietStatus::Paused));
        assert!(DietStatus::Paused.can_transition_to(&DietStatus::Active));
    }

    #[test]
    fn expired_and_paused_cannot_expire_again() {
        assert!(DietStatus::Expired.transition_to(DietStatus::Expired).is_err());
        assert!(DietStatus::Paused.transition_to(DietStatus::Expired).is_err());
    }

    #[test]
    fn superseded_diet_is_not_renewable() {
        assert!(!DietStatus::Superseded.is_renewable());
        assert!(DietStatus::Expired.is_renewable());
    }
}
