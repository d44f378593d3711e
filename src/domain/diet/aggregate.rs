//! Diet aggregate entity.
//!
//! A diet is a nutrition plan with a fixed validity window, owned by a client
//! and authored by a nutritionist. Renewals form a singly-linked chain through
//! `predecessor_id`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DietId, DomainError, ErrorCode, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{compute_status, DietObjective, DietStatus, DietStatusView};

/// Window length used when the author does not pick one.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Configured bounds for diet windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DietLimits {
    pub max_duration_days: u32,
}

impl Default for DietLimits {
    fn default() -> Self {
        Self {
            max_duration_days: 365,
        }
    }
}

/// Validated plan content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietContent {
    pub name: String,
    pub description: String,
    pub objective: DietObjective,
    /// Total daily target calories.
    pub calories: u32,
}

impl DietContent {
    pub const NAME_MAX_CHARS: usize = 200;
    pub const MAX_CALORIES: u32 = 10_000;

    pub fn new(
        name: &str,
        description: &str,
        objective: DietObjective,
        calories: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let name_chars = name.chars().count();
        if name_chars > Self::NAME_MAX_CHARS {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                Self::NAME_MAX_CHARS as i64,
                name_chars as i64,
            ));
        }
        if calories == 0 || calories > Self::MAX_CALORIES {
            return Err(ValidationError::out_of_range(
                "calories",
                1,
                i64::from(Self::MAX_CALORIES),
                i64::from(calories),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            description: description.trim().to_string(),
            objective,
            calories,
        })
    }
}

/// Requested validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DietWindow {
    pub duration_days: u32,
    /// Explicit expiry; defaults to `created_at + duration_days`.
    pub expires_at: Option<Timestamp>,
}

impl DietWindow {
    pub fn days(duration_days: u32) -> Self {
        Self {
            duration_days,
            expires_at: None,
        }
    }
}

impl Default for DietWindow {
    fn default() -> Self {
        Self::days(DEFAULT_DURATION_DAYS)
    }
}

/// Diet aggregate.
///
/// # Invariants
///
/// - `duration_days >= 1`
/// - `expires_at > created_at`
/// - `predecessor_id`, when set, names a diet persisted before this one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diet {
    pub id: DietId,
    pub owner_id: UserId,
    /// Nutritionist who authored this plan.
    pub nutritionist_id: UserId,
    pub content: DietContent,
    pub duration_days: u32,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: DietStatus,
    pub predecessor_id: Option<DietId>,
    pub updated_at: Timestamp,
    pub version: i32,
}

impl Diet {
    /// Creates an active diet.
    pub fn create(
        id: DietId,
        owner_id: UserId,
        nutritionist_id: UserId,
        content: DietContent,
        window: DietWindow,
        limits: &DietLimits,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if window.duration_days == 0 || window.duration_days > limits.max_duration_days {
            return Err(ValidationError::out_of_range(
                "duration_days",
                1,
                i64::from(limits.max_duration_days),
                i64::from(window.duration_days),
            )
            .into());
        }

        let expires_at = match window.expires_at {
            Some(explicit) if !explicit.is_after(&now) => {
                return Err(DomainError::validation(
                    "expires_at",
                    "Expiry must be later than the creation time",
                ));
            }
            Some(explicit) => explicit,
            None => now.add_days(i64::from(window.duration_days)),
        };

        Ok(Self {
            id,
            owner_id,
            nutritionist_id,
            content,
            duration_days: window.duration_days,
            created_at: now,
            expires_at,
            status: DietStatus::Active,
            predecessor_id: None,
            updated_at: now,
            version: 1,
        })
    }

    /// Builds the successor of this diet and marks this one superseded.
    ///
    /// The successor inherits the owner. Nothing is mutated if the successor
    /// fails validation.
    pub fn renew(
        &mut self,
        successor_id: DietId,
        nutritionist_id: UserId,
        content: DietContent,
        window: DietWindow,
        limits: &DietLimits,
        now: Timestamp,
    ) -> Result<Diet, DomainError> {
        if !self.status.is_renewable() {
            return Err(self.invalid_transition("renew"));
        }

        let mut successor = Diet::create(
            successor_id,
            self.owner_id,
            nutritionist_id,
            content,
            window,
            limits,
            now,
        )?;
        successor.predecessor_id = Some(self.id);

        self.transition_to(DietStatus::Superseded, "renew")?;
        self.updated_at = now;
        Ok(successor)
    }

    /// Records that the window has passed.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.needs_expiry(now) {
            return Err(self.invalid_transition("expire"));
        }
        self.transition_to(DietStatus::Expired, "expire")?;
        self.updated_at = now;
        Ok(())
    }

    pub fn pause(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(DietStatus::Paused, "pause")?;
        self.updated_at = now;
        Ok(())
    }

    pub fn reactivate(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status != DietStatus::Paused {
            return Err(self.invalid_transition("reactivate"));
        }
        self.transition_to(DietStatus::Active, "reactivate")?;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the diet to another client.
    pub fn reassign(&mut self, new_owner: UserId, now: Timestamp) -> Result<(), DomainError> {
        if !matches!(self.status, DietStatus::Active | DietStatus::Paused) {
            return Err(self.invalid_transition("reassign"));
        }
        if new_owner == self.owner_id {
            return Err(DomainError::validation(
                "owner_id",
                "Diet already belongs to this client",
            ));
        }
        if new_owner == self.nutritionist_id {
            return Err(DomainError::new(
                ErrorCode::InvalidParty,
                "A diet cannot be assigned to its author",
            ));
        }
        self.owner_id = new_owner;
        self.updated_at = now;
        Ok(())
    }

    /// Pulls `expires_at` back to `limit` when the window would outlast it.
    ///
    /// `duration_days` follows the capped window, rounded up to whole days.
    /// A `limit` at or before `created_at` is ignored. Returns true if capped.
    pub fn cap_expiry(&mut self, limit: Timestamp) -> bool {
        if limit.is_after(&self.created_at) && self.expires_at.is_after(&limit) {
            self.expires_at = limit;
            let window_days = compute_status(self.created_at, limit, self.created_at).days_remaining;
            self.duration_days = u32::try_from(window_days).unwrap_or(self.duration_days);
            true
        } else {
            false
        }
    }

    pub fn status_view(&self, now: Timestamp) -> DietStatusView {
        compute_status(self.created_at, self.expires_at, now)
    }

    /// Stored as active but past its window; a sweep will expire it.
    pub fn needs_expiry(&self, now: Timestamp) -> bool {
        self.status == DietStatus::Active && now.is_after(&self.expires_at)
    }

    /// Active and still inside its window.
    pub fn is_in_effect(&self, now: Timestamp) -> bool {
        self.status == DietStatus::Active && !now.is_after(&self.expires_at)
    }

    fn transition_to(&mut self, target: DietStatus, attempted: &str) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| self.invalid_transition(attempted).with_detail("reason", e.to_string()))?;
        Ok(())
    }

    fn invalid_transition(&self, attempted: &str) -> DomainError {
        DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cannot {} a {} diet", attempted, self.status),
        )
        .with_detail("current", self.status.as_str())
        .with_detail("attempted", attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    fn content(calories: u32) -> DietContent {
        DietContent::new("Lean cut", "High protein", DietObjective::Definition, calories).unwrap()
    }

    fn diet() -> Diet {
        Diet::create(
            DietId::new(),
            UserId::new(),
            UserId::new(),
            content(2000),
            DietWindow::default(),
            &DietLimits::default(),
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn cap_expiry_only_shortens() {
        let mut d = diet();
        assert!(!d.cap_expiry(t0().add_days(40)));
        assert_eq!(d.expires_at, t0().add_days(30));

        assert!(d.cap_expiry(t0().add_days(10)));
        assert_eq!(d.expires_at, t0().add_days(10));
        assert_eq!(d.duration_days, 10);

        assert!(!d.cap_expiry(t0()));
        assert_eq!(d.expires_at, t0().add_days(10));
    }

    #[test]
    fn capped_partial_day_rounds_duration_up() {
        let mut d = diet();
        assert!(d.cap_expiry(t0().add_days(5).add_hours(6)));
        assert_eq!(d.duration_days, 6);
        assert_eq!(d.status_view(t0()).days_remaining, 6);
    }

    #[test]
    fn create_defaults_to_thirty_day_window() {
        let diet = diet();
        assert_eq!(diet.status, DietStatus::Active);
        assert_eq!(diet.duration_days, 30);
        assert_eq!(diet.expires_at, t0().add_days(30));
        assert!(diet.predecessor_id.is_none());
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let err = Diet::create(
            DietId::new(),
            UserId::new(),
            UserId::new(),
            content(2000),
            DietWindow::days(0),
            &DietLimits::default(),
            t0(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.detail("field"), Some("duration_days"));
    }

    #[test]
    fn explicit_expiry_overrides_duration() {
        let window = DietWindow {
            duration_days: 30,
            expires_at: Some(t0().add_days(10)),
        };
        let diet = Diet::create(
            DietId::new(),
            UserId::new(),
            UserId::new(),
            content(1800),
            window,
            &DietLimits::default(),
            t0(),
        )
        .unwrap();
        assert_eq!(diet.expires_at, t0().add_days(10));
    }

    #[test]
    fn explicit_expiry_in_the_past_is_rejected() {
        let window = DietWindow {
            duration_days: 30,
            expires_at: Some(t0().minus_days(1)),
        };
        assert!(Diet::create(
            DietId::new(),
            UserId::new(),
            UserId::new(),
            content(1800),
            window,
            &DietLimits::default(),
            t0(),
        )
        .is_err());
    }

    #[test]
    fn content_rejects_zero_calories_and_blank_name() {
        assert_eq!(
            DietContent::new("x", "", DietObjective::Healthy, 0).unwrap_err().field(),
            "calories"
        );
        assert_eq!(
            DietContent::new("  ", "", DietObjective::Healthy, 1500).unwrap_err().field(),
            "name"
        );
    }

    #[test]
    fn renew_links_successor_and_supersedes_predecessor() {
        let mut predecessor = diet();
        let later = t0().add_days(31);
        predecessor.expire(later).unwrap();

        let successor = predecessor
            .renew(
                DietId::new(),
                predecessor.nutritionist_id,
                content(2100),
                DietWindow::default(),
                &DietLimits::default(),
                later,
            )
            .unwrap();

        assert_eq!(predecessor.status, DietStatus::Superseded);
        assert_eq!(successor.status, DietStatus::Active);
        assert_eq!(successor.predecessor_id, Some(predecessor.id));
        assert_eq!(successor.owner_id, predecessor.owner_id);
        assert_eq!(successor.expires_at, later.add_days(30));
    }

    #[test]
    fn invalid_successor_leaves_predecessor_untouched() {
        let mut predecessor = diet();
        let before = predecessor.clone();
        let result = predecessor.renew(
            DietId::new(),
            predecessor.nutritionist_id,
            content(2100),
            DietWindow::days(0),
            &DietLimits::default(),
            t0(),
        );
        assert!(result.is_err());
        assert_eq!(predecessor, before);
    }

    #[test]
    fn superseded_diet_cannot_be_renewed_again() {
        let mut predecessor = diet();
        let limits = DietLimits::default();
        predecessor
            .renew(DietId::new(), UserId::new(), content(2000), DietWindow::default(), &limits, t0())
            .unwrap();
        let err = predecessor
            .renew(DietId::new(), UserId::new(), content(2000), DietWindow::default(), &limits, t0())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn expire_requires_window_passed() {
        let mut diet = diet();
        assert!(diet.expire(t0().add_days(30)).is_err());
        diet.expire(t0().add_days(30).add_hours(1)).unwrap();
        assert_eq!(diet.status, DietStatus::Expired);
        assert!(diet.expire(t0().add_days(40)).is_err());
    }

    #[test]
    fn pause_and_reactivate() {
        let mut diet = diet();
        diet.pause(t0()).unwrap();
        assert_eq!(diet.status, DietStatus::Paused);
        assert!(diet.pause(t0()).is_err());
        diet.reactivate(t0()).unwrap();
        assert_eq!(diet.status, DietStatus::Active);
        assert!(diet.reactivate(t0()).is_err());
    }

    #[test]
    fn reassign_changes_owner_only_for_live_diets() {
        let mut diet = diet();
        let new_owner = UserId::new();
        diet.reassign(new_owner, t0()).unwrap();
        assert_eq!(diet.owner_id, new_owner);

        diet.expire(t0().add_days(31)).unwrap();
        assert!(diet.reassign(UserId::new(), t0().add_days(31)).is_err());
    }

    #[test]
    fn in_effect_tracks_clock() {
        let diet = diet();
        assert!(diet.is_in_effect(t0().add_days(29)));
        assert!(!diet.is_in_effect(t0().add_days(31)));
        assert!(diet.needs_expiry(t0().add_days(31)));
    }
}
