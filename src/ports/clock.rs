//! Clock port.
//!
//! Lifecycle decisions compare against "now" (expiry, completion, the
//! cancellation window). Handlers read it from this port so the same code runs
//! against wall-clock time in production and a controlled clock in tests.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_object_safe() {
        fn _accepts_dyn(_clock: &dyn Clock) {}
    }
}
