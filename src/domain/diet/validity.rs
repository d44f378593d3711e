//! Derived validity of a diet window.
//!
//! Nothing here is persisted. Storing "days remaining" would drift from the
//! clock the moment it was written.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Clock-relative view of a diet's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DietStatusView {
    /// `now > expires_at`.
    pub is_expired: bool,
    /// Whole days left, rounded up; zero once expired.
    pub days_remaining: i64,
    /// Share of the window already elapsed, 0 to 100.
    pub percent_elapsed: f64,
}

/// Computes the validity view of a window at `now`.
pub fn compute_status(created_at: Timestamp, expires_at: Timestamp, now: Timestamp) -> DietStatusView {
    let remaining_ms = expires_at.duration_since(&now).num_milliseconds();
    let days_remaining = if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    };

    let total_ms = expires_at.duration_since(&created_at).num_milliseconds();
    let percent_elapsed = if total_ms <= 0 {
        0.0
    } else {
        let elapsed_ms = now.duration_since(&created_at).num_milliseconds();
        (100.0 * elapsed_ms as f64 / total_ms as f64).clamp(0.0, 100.0)
    };

    DietStatusView {
        is_expired: now.is_after(&expires_at),
        days_remaining,
        percent_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t0() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    #[test]
    fn thirty_day_window_at_creation() {
        let view = compute_status(t0(), t0().add_days(30), t0());
        assert_eq!(view.days_remaining, 30);
        assert!(!view.is_expired);
        assert_eq!(view.percent_elapsed, 0.0);
    }

    #[test]
    fn thirty_day_window_after_thirty_one_days() {
        let view = compute_status(t0(), t0().add_days(30), t0().add_days(31));
        assert_eq!(view.days_remaining, 0);
        assert!(view.is_expired);
        assert_eq!(view.percent_elapsed, 100.0);
    }

    #[test]
    fn partial_day_rounds_up() {
        let view = compute_status(t0(), t0().add_days(30), t0().add_hours(1));
        assert_eq!(view.days_remaining, 30);
        let view = compute_status(t0(), t0().add_days(30), t0().add_days(29).add_hours(23));
        assert_eq!(view.days_remaining, 1);
    }

    #[test]
    fn exactly_at_expiry_is_not_yet_expired() {
        let view = compute_status(t0(), t0().add_days(30), t0().add_days(30));
        assert!(!view.is_expired);
        assert_eq!(view.days_remaining, 0);
    }

    #[test]
    fn halfway_is_fifty_percent() {
        let view = compute_status(t0(), t0().add_days(30), t0().add_days(15));
        assert!((view.percent_elapsed - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_window_reports_zero_percent() {
        let view = compute_status(t0(), t0(), t0().add_days(1));
        assert_eq!(view.percent_elapsed, 0.0);
        assert!(view.is_expired);
    }

    proptest! {
        #[test]
        fn percent_is_always_clamped(duration in 1i64..400, offset_hours in -2_000i64..20_000) {
            let now = t0().add_hours(offset_hours);
            let view = compute_status(t0(), t0().add_days(duration), now);
            prop_assert!((0.0..=100.0).contains(&view.percent_elapsed));
        }

        #[test]
        fn expired_implies_no_days_remaining(duration in 1i64..400, offset_hours in 0i64..20_000) {
            let now = t0().add_hours(offset_hours);
            let view = compute_status(t0(), t0().add_days(duration), now);
            if view.is_expired {
                prop_assert_eq!(view.days_remaining, 0);
            } else {
                prop_assert!(view.days_remaining <= duration);
            }
        }

        #[test]
        fn days_remaining_never_increases(duration in 1i64..400, a in 0i64..10_000, b in 0i64..10_000) {
            let (earlier, later) = (a.min(b), a.max(b));
            let expires = t0().add_days(duration);
            let first = compute_status(t0(), expires, t0().add_hours(earlier));
            let second = compute_status(t0(), expires, t0().add_hours(later));
            prop_assert!(second.days_remaining <= first.days_remaining);
        }
    }
}
