//! PostgreSQL party directory.
//!
//! Reads the `users` table owned by the account subsystem. Never writes.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::engagement::{Party, PartyRole};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::PartyDirectory;

pub struct PostgresPartyDirectory {
    pool: PgPool,
}

impl PostgresPartyDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    display_name: Option<String>,
    role: String,
    verified: bool,
}

impl TryFrom<UserRow> for Party {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<PartyRole>().map_err(|e| {
            DomainError::database(format!("Invalid role for user {}: {}", row.id, e))
        })?;
        Ok(Party {
            id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            role,
            verified: row.verified,
        })
    }
}

#[async_trait]
impl PartyDirectory for PostgresPartyDirectory {
    async fn find(&self, id: &UserId) -> Result<Option<Party>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, display_name, role, verified FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find user: {}", e)))?;

        row.map(Party::try_from).transpose()
    }

    async fn display_names(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT id, display_name FROM users WHERE id = ANY($1) AND display_name IS NOT NULL",
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to read display names: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (UserId::from_uuid(id), name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            display_name: None,
            role: "admin".to_string(),
            verified: true,
        };
        assert!(Party::try_from(row).is_err());
    }

    #[test]
    fn nutritionist_row_converts() {
        let row = UserRow {
            id: Uuid::new_v4(),
            display_name: Some("Dr. Lee".to_string()),
            role: "nutritionist".to_string(),
            verified: true,
        };
        let party = Party::try_from(row).unwrap();
        assert!(party.is_nutritionist());
        assert!(party.verified);
    }
}
