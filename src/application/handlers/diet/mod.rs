//! Diet handlers.
//!
//! ## Commands
//! - Creating and renewing diets
//! - Pausing, reactivating and reassigning
//! - Sweeping lapsed diets to `expired`
//!
//! ## Queries
//! - One diet with its validity
//! - A client's diets

mod create_diet;
mod diet_status;
mod list_diets;
mod pause_diet;
mod reactivate_diet;
mod reassign_diet;
mod renew_diet;
mod sweep_expirations;

use crate::domain::diet::{DietWindow, DEFAULT_DURATION_DAYS};
use crate::domain::foundation::Timestamp;

// Commands
pub use create_diet::{CreateDietCommand, CreateDietHandler};
pub use pause_diet::{PauseDietCommand, PauseDietHandler};
pub use reactivate_diet::{ReactivateDietCommand, ReactivateDietHandler};
pub use reassign_diet::{ReassignDietCommand, ReassignDietHandler};
pub use renew_diet::{RenewDietCommand, RenewDietHandler, RenewDietResult};
pub use sweep_expirations::{SweepExpirationsCommand, SweepExpirationsHandler};

// Queries
pub use diet_status::{DietStatusHandler, DietStatusQuery, DietView};
pub use list_diets::{ListDietsHandler, ListDietsQuery};

fn requested_window(duration_days: Option<u32>, expires_at: Option<Timestamp>) -> DietWindow {
    DietWindow {
        duration_days: duration_days.unwrap_or(DEFAULT_DURATION_DAYS),
        expires_at,
    }
}
