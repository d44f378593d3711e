//! Contract domain - paid engagements between clients and nutritionists.
//!
//! State machine: `pending → active → completed`, with `cancelled` reachable
//! from either open state by the client.

mod aggregate;
mod events;
mod status;
mod terms;

pub use aggregate::{Activation, Contract};
pub use events::ContractEvent;
pub use status::ContractStatus;
pub use terms::{ContractTerms, Currency, DurationMonths, Money, TermsLimits};
