//! PostgreSQL implementation of DietRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::diet::{Diet, DietContent, DietObjective, DietStatus};
use crate::domain::foundation::{DietId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::DietRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, nutritionist_id, name, description, objective, calories,
           duration_days, created_at, expires_at, status, predecessor_id,
           updated_at, version
    FROM diets
"#;

pub struct PostgresDietRepository {
    pool: PgPool,
}

impl PostgresDietRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DietRow {
    id: Uuid,
    owner_id: Uuid,
    nutritionist_id: Uuid,
    name: String,
    description: String,
    objective: String,
    calories: i32,
    duration_days: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    status: String,
    predecessor_id: Option<Uuid>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<DietRow> for Diet {
    type Error = DomainError;

    fn try_from(row: DietRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |field: &str, reason: String| {
            DomainError::database(format!("Invalid {} in diet {}: {}", field, id, reason))
        };

        let objective = row
            .objective
            .parse::<DietObjective>()
            .map_err(|e| corrupt("objective", e))?;
        let status = row
            .status
            .parse::<DietStatus>()
            .map_err(|e| corrupt("status", e))?;
        let calories =
            u32::try_from(row.calories).map_err(|e| corrupt("calories", e.to_string()))?;
        let duration_days =
            u32::try_from(row.duration_days).map_err(|e| corrupt("duration_days", e.to_string()))?;

        Ok(Diet {
            id: DietId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            nutritionist_id: UserId::from_uuid(row.nutritionist_id),
            content: DietContent {
                name: row.name,
                description: row.description,
                objective,
                calories,
            },
            duration_days,
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            status,
            predecessor_id: row.predecessor_id.map(DietId::from_uuid),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

fn rows_to_diets(rows: Vec<DietRow>) -> Result<Vec<Diet>, DomainError> {
    rows.into_iter().map(Diet::try_from).collect()
}

async fn insert_diet(tx: &mut Transaction<'_, Postgres>, diet: &Diet) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO diets (
            id, owner_id, nutritionist_id, name, description, objective, calories,
            duration_days, created_at, expires_at, status, predecessor_id,
            updated_at, version
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(diet.id.as_uuid())
    .bind(diet.owner_id.as_uuid())
    .bind(diet.nutritionist_id.as_uuid())
    .bind(&diet.content.name)
    .bind(&diet.content.description)
    .bind(diet.content.objective.as_str())
    .bind(diet.content.calories as i32)
    .bind(diet.duration_days as i32)
    .bind(diet.created_at.as_datetime())
    .bind(diet.expires_at.as_datetime())
    .bind(diet.status.as_str())
    .bind(diet.predecessor_id.map(|id| *id.as_uuid()))
    .bind(diet.updated_at.as_datetime())
    .bind(diet.version)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert diet", e))?;

    Ok(())
}

/// Guarded write of the mutable columns.
async fn update_diet(
    tx: &mut Transaction<'_, Postgres>,
    diet: &Diet,
    expected: DietStatus,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE diets SET
            owner_id = $2,
            status = $3,
            updated_at = $4,
            version = version + 1
        WHERE id = $1 AND status = $5 AND version = $6
        "#,
    )
    .bind(diet.id.as_uuid())
    .bind(diet.owner_id.as_uuid())
    .bind(diet.status.as_str())
    .bind(diet.updated_at.as_datetime())
    .bind(expected.as_str())
    .bind(diet.version)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to update diet", e))?;

    if result.rows_affected() == 0 {
        let current: Option<(String,)> = sqlx::query_as("SELECT status FROM diets WHERE id = $1")
            .bind(diet.id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to read diet status", e))?;

        return Err(match current {
            None => DomainError::new(ErrorCode::DietNotFound, "Diet not found")
                .with_detail("id", diet.id.to_string()),
            Some((status,)) => DomainError::new(
                ErrorCode::ConcurrentModification,
                "Diet was modified concurrently",
            )
            .with_detail("current", status)
            .with_detail("attempted", format!("write from {}", expected)),
        });
    }

    Ok(())
}

impl PostgresDietRepository {
    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", e))
}

#[async_trait]
impl DietRepository for PostgresDietRepository {
    async fn insert(&self, diet: &Diet) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        insert_diet(&mut tx, diet).await?;
        commit(tx).await
    }

    async fn update(&self, diet: &Diet, expected: DietStatus) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        update_diet(&mut tx, diet, expected).await?;
        commit(tx).await
    }

    async fn save_renewal(
        &self,
        predecessor: &Diet,
        expected: DietStatus,
        successor: &Diet,
    ) -> Result<(), DomainError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.begin().await?;
        update_diet(&mut tx, predecessor, expected).await?;
        insert_diet(&mut tx, successor).await?;
        commit(tx).await
    }

    async fn find_by_id(&self, id: &DietId) -> Result<Option<Diet>, DomainError> {
        let row: Option<DietRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find diet", e))?;

        row.map(Diet::try_from).transpose()
    }

    async fn find_by_owner(
        &self,
        owner_id: &UserId,
        status: Option<DietStatus>,
    ) -> Result<Vec<Diet>, DomainError> {
        let rows: Vec<DietRow> = sqlx::query_as(&format!(
            "{} WHERE owner_id = $1 AND ($2::text IS NULL OR status = $2) ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(owner_id.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list diets", e))?;

        rows_to_diets(rows)
    }

    async fn find_lapsed(
        &self,
        owner_id: Option<&UserId>,
        now: Timestamp,
    ) -> Result<Vec<Diet>, DomainError> {
        let rows: Vec<DietRow> = sqlx::query_as(&format!(
            r#"{} WHERE status = 'active' AND expires_at < $1
                  AND ($2::uuid IS NULL OR owner_id = $2)"#,
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .bind(owner_id.map(|id| *id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list lapsed diets", e))?;

        rows_to_diets(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DietRow {
        let now = Utc::now();
        DietRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            nutritionist_id: Uuid::new_v4(),
            name: "Lean bulk".to_string(),
            description: String::new(),
            objective: "muscle_gain".to_string(),
            calories: 2800,
            duration_days: 30,
            created_at: now,
            expires_at: now + chrono::Duration::days(30),
            status: "paused".to_string(),
            predecessor_id: Some(Uuid::new_v4()),
            updated_at: now,
            version: 2,
        }
    }

    #[test]
    fn row_converts_to_diet() {
        let diet = Diet::try_from(row()).unwrap();
        assert_eq!(diet.status, DietStatus::Paused);
        assert_eq!(diet.content.objective, DietObjective::MuscleGain);
        assert!(diet.predecessor_id.is_some());
    }

    #[test]
    fn negative_calories_are_a_database_error() {
        let mut bad = row();
        bad.calories = -1;
        let err = Diet::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
