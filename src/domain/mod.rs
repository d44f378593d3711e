//! Domain layer - pure business logic with no I/O.

pub mod contract;
pub mod diet;
pub mod engagement;
pub mod foundation;
