//! Engagement policy configuration
//!
//! Bounds on contract terms and diet windows, plus the switches that pick
//! between the stricter and looser engagement rules.

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::contract::{Money, TermsLimits};
use crate::domain::diet::DietLimits;
use crate::domain::engagement::{EngagementPolicy, ReassignmentPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    #[serde(default = "default_min_amount_cents")]
    pub min_amount_cents: i64,

    #[serde(default = "default_max_amount_cents")]
    pub max_amount_cents: i64,

    /// Days after `starts_at` during which an active contract may be cancelled
    #[serde(default = "default_cancellation_window_days")]
    pub cancellation_window_days: u32,

    /// Hours a contract may stay pending before it is reported as stale
    #[serde(default = "default_pending_grace_hours")]
    pub pending_grace_hours: u32,

    #[serde(default = "default_max_diet_duration_days")]
    pub max_diet_duration_days: u32,

    /// Expire lapsed diets before listing them
    #[serde(default = "default_true")]
    pub sweep_on_read: bool,

    /// Clamp diet expiry to the governing contract's `ends_at`
    #[serde(default)]
    pub cap_to_contract_end: bool,

    #[serde(default = "default_true")]
    pub require_active_contract_for_renewal: bool,

    #[serde(default)]
    pub reassignment: ReassignmentPolicy,
}

impl EngagementConfig {
    pub fn terms_limits(&self) -> TermsLimits {
        TermsLimits {
            min_amount: Money::from_cents(self.min_amount_cents),
            max_amount: Money::from_cents(self.max_amount_cents),
        }
    }

    pub fn diet_limits(&self) -> DietLimits {
        DietLimits {
            max_duration_days: self.max_diet_duration_days,
        }
    }

    pub fn policy(&self) -> EngagementPolicy {
        EngagementPolicy {
            reassignment: self.reassignment,
            require_active_contract_for_renewal: self.require_active_contract_for_renewal,
        }
    }

    pub fn cancellation_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.cancellation_window_days))
    }

    pub fn pending_grace(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.pending_grace_hours))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_amount_cents <= 0 || self.min_amount_cents > self.max_amount_cents {
            return Err(ValidationError::InvalidAmountBounds);
        }
        if self.max_diet_duration_days == 0 {
            return Err(ValidationError::InvalidEngagementSetting(
                "max_diet_duration_days must be at least 1",
            ));
        }
        if self.pending_grace_hours == 0 {
            return Err(ValidationError::InvalidEngagementSetting(
                "pending_grace_hours must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_amount_cents: default_min_amount_cents(),
            max_amount_cents: default_max_amount_cents(),
            cancellation_window_days: default_cancellation_window_days(),
            pending_grace_hours: default_pending_grace_hours(),
            max_diet_duration_days: default_max_diet_duration_days(),
            sweep_on_read: true,
            cap_to_contract_end: false,
            require_active_contract_for_renewal: true,
            reassignment: ReassignmentPolicy::default(),
        }
    }
}

fn default_min_amount_cents() -> i64 {
    1_000
}

fn default_max_amount_cents() -> i64 {
    50_000
}

fn default_cancellation_window_days() -> u32 {
    7
}

fn default_pending_grace_hours() -> u32 {
    24
}

fn default_max_diet_duration_days() -> u32 {
    365
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_domain_defaults() {
        let config = EngagementConfig::default();
        assert_eq!(config.terms_limits(), TermsLimits::default());
        assert_eq!(config.diet_limits(), DietLimits::default());
        assert_eq!(config.policy(), EngagementPolicy::default());
        assert_eq!(config.cancellation_window(), chrono::Duration::days(7));
        assert!(config.sweep_on_read);
        assert!(!config.cap_to_contract_end);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_amount_bounds_are_rejected() {
        let config = EngagementConfig {
            min_amount_cents: 60_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAmountBounds));
    }

    #[test]
    fn zero_diet_duration_cap_is_rejected() {
        let config = EngagementConfig {
            max_diet_duration_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
