//! State machine trait for lifecycle status enums.
//!
//! Contract and diet statuses implement this trait so that every status change
//! goes through a single, table-driven check. Aggregates never assign a status
//! directly; they ask the current status for the next one.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list the allowed edges once and get a validated
/// `transition_to` for free.
///
/// ```ignore
/// impl StateMachine for ContractStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Pending, Active) | (Active, Completed) /* ... */)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> { /* ... */ }
/// }
///
/// let next = contract.status.transition_to(ContractStatus::Active)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Dimmed,
        Broken,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Light::*;
            matches!(
                (self, target),
                (Off, On) | (On, Off) | (On, Dimmed) | (Dimmed, On) | (On, Broken)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Off => vec![On],
                On => vec![Off, Dimmed, Broken],
                Dimmed => vec![On],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_returns_target_for_allowed_edge() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
    }

    #[test]
    fn transition_to_rejects_missing_edge() {
        let err = Light::Off.transition_to(Light::Dimmed).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Off to Dimmed"));
    }

    #[test]
    fn state_without_outgoing_edges_is_terminal() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::Dimmed.is_terminal());
    }

    #[test]
    fn can_transition_to_agrees_with_valid_transitions() {
        for status in [Light::Off, Light::On, Light::Dimmed, Light::Broken] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target), "{:?} -> {:?}", status, target);
            }
        }
    }
}
