//! Parties to an engagement, as seen by this core.
//!
//! Accounts are managed elsewhere; the core only needs role, verification
//! and a display name.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Name shown when a counterpart has no display name on record.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Account role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Client,
    Nutritionist,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Client => "client",
            PartyRole::Nutritionist => "nutritionist",
        }
    }
}

impl std::str::FromStr for PartyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(PartyRole::Client),
            "nutritionist" => Ok(PartyRole::Nutritionist),
            other => Err(format!("unknown party role: {}", other)),
        }
    }
}

/// Read-only projection of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: UserId,
    pub display_name: Option<String>,
    pub role: PartyRole,
    /// Nutritionists must be verified before they can be engaged.
    pub verified: bool,
}

impl Party {
    pub fn client(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: Some(display_name.into()),
            role: PartyRole::Client,
            verified: false,
        }
    }

    pub fn nutritionist(id: UserId, display_name: impl Into<String>, verified: bool) -> Self {
        Self {
            id,
            display_name: Some(display_name.into()),
            role: PartyRole::Nutritionist,
            verified,
        }
    }

    pub fn is_nutritionist(&self) -> bool {
        self.role == PartyRole::Nutritionist
    }

    /// Display name, or `"Unknown"` when missing or blank.
    pub fn display_name_or_unknown(&self) -> String {
        display_name_or_unknown(self.display_name.as_deref())
    }
}

pub fn display_name_or_unknown(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_DISPLAY_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_display_name_renders_unknown() {
        let mut party = Party::client(UserId::new(), "   ");
        assert_eq!(party.display_name_or_unknown(), "Unknown");
        party.display_name = None;
        assert_eq!(party.display_name_or_unknown(), "Unknown");
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [PartyRole::Client, PartyRole::Nutritionist] {
            assert_eq!(role.as_str().parse::<PartyRole>(), Ok(role));
        }
        assert!("admin".parse::<PartyRole>().is_err());
    }
}
