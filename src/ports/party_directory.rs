//! Party directory port (read side).
//!
//! Read-only access to user accounts owned by another subsystem.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::engagement::Party;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait PartyDirectory: Send + Sync {
    /// Looks up a user. `None` if no such account exists.
    async fn find(&self, id: &UserId) -> Result<Option<Party>, DomainError>;

    /// Display names for the given users. Unknown ids are absent from the map.
    async fn display_names(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn PartyDirectory) {}
    }
}
