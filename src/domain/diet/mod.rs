//! Diet domain - nutrition plans with expiring validity windows.
//!
//! Diets start `active`, lapse to `expired` when swept after `expires_at`,
//! and are `superseded` when renewed. Pausing is a manual round trip.

mod aggregate;
mod events;
mod objective;
mod status;
mod validity;

pub use aggregate::{Diet, DietContent, DietLimits, DietWindow, DEFAULT_DURATION_DAYS};
pub use events::DietEvent;
pub use objective::DietObjective;
pub use status::DietStatus;
pub use validity::{compute_status, DietStatusView};
