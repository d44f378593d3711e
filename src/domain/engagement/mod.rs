//! Engagement - the rules that span contracts and diets.
//!
//! - `EngagementError` is the error taxonomy every lifecycle operation reports
//! - `EngagementPolicy` holds the guard predicates binding diets to contracts
//! - `Party` is the read-only view of a user account

mod errors;
mod party;
mod policy;

pub use errors::EngagementError;
pub use party::{display_name_or_unknown, Party, PartyRole, UNKNOWN_DISPLAY_NAME};
pub use policy::{AccessLevel, EngagementPolicy, ReassignmentPolicy};
