//! PostgreSQL implementation of ContractRepository.
//!
//! Duplicate prevention relies on the partial unique index
//! `contracts_open_pair_key`, so two concurrent initiations for the same pair
//! cannot both commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::contract::{
    Contract, ContractStatus, ContractTerms, Currency, DurationMonths, Money,
};
use crate::domain::foundation::{ContractId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::ContractRepository;

const OPEN_PAIR_CONSTRAINT: &str = "contracts_open_pair_key";
const AUTHORIZATION_CONSTRAINT: &str = "contracts_payment_authorization_id_key";

const SELECT_COLUMNS: &str = r#"
    SELECT id, client_id, nutritionist_id, amount_cents, currency, duration_months,
           description, payment_authorization_id, status, validated,
           created_at, starts_at, ends_at, updated_at, version
    FROM contracts
"#;

pub struct PostgresContractRepository {
    pool: PgPool,
}

impl PostgresContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContractRow {
    id: Uuid,
    client_id: Uuid,
    nutritionist_id: Uuid,
    amount_cents: i64,
    currency: String,
    duration_months: i32,
    description: String,
    payment_authorization_id: Option<String>,
    status: String,
    validated: bool,
    created_at: DateTime<Utc>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<ContractRow> for Contract {
    type Error = DomainError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |field: &str, reason: String| {
            DomainError::database(format!("Invalid {} in contract {}: {}", field, id, reason))
        };

        let terms = ContractTerms {
            amount: Money::from_cents(row.amount_cents),
            currency: Currency::new(&row.currency).map_err(|e| corrupt("currency", e.to_string()))?,
            duration: DurationMonths::new(i64::from(row.duration_months))
                .map_err(|e| corrupt("duration_months", e.to_string()))?,
            description: row.description.clone(),
        };
        let status = row
            .status
            .parse::<ContractStatus>()
            .map_err(|e| corrupt("status", e))?;

        Ok(Contract {
            id: ContractId::from_uuid(row.id),
            client_id: UserId::from_uuid(row.client_id),
            nutritionist_id: UserId::from_uuid(row.nutritionist_id),
            terms,
            payment_authorization_id: row.payment_authorization_id,
            status,
            validated: row.validated,
            created_at: Timestamp::from_datetime(row.created_at),
            starts_at: row.starts_at.map(Timestamp::from_datetime),
            ends_at: row.ends_at.map(Timestamp::from_datetime),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn rows_to_contracts(rows: Vec<ContractRow>) -> Result<Vec<Contract>, DomainError> {
    rows.into_iter().map(Contract::try_from).collect()
}

fn status_names(statuses: &[ContractStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

#[async_trait]
impl ContractRepository for PostgresContractRepository {
    async fn insert_pending(&self, contract: &Contract) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, client_id, nutritionist_id, amount_cents, currency, duration_months,
                description, payment_authorization_id, status, validated,
                created_at, starts_at, ends_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(contract.id.as_uuid())
        .bind(contract.client_id.as_uuid())
        .bind(contract.nutritionist_id.as_uuid())
        .bind(contract.terms.amount.cents())
        .bind(contract.terms.currency.as_str())
        .bind(contract.terms.duration.months() as i32)
        .bind(&contract.terms.description)
        .bind(&contract.payment_authorization_id)
        .bind(contract.status.as_str())
        .bind(contract.validated)
        .bind(contract.created_at.as_datetime())
        .bind(contract.starts_at.map(|t| *t.as_datetime()))
        .bind(contract.ends_at.map(|t| *t.as_datetime()))
        .bind(contract.updated_at.as_datetime())
        .bind(contract.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(OPEN_PAIR_CONSTRAINT) {
                return DomainError::new(
                    ErrorCode::DuplicateEngagement,
                    "An open contract already exists for this pair",
                )
                .with_detail("client_id", contract.client_id.to_string())
                .with_detail("nutritionist_id", contract.nutritionist_id.to_string());
            }
            db_error("Failed to insert contract", e)
        })?;

        Ok(())
    }

    async fn update(
        &self,
        contract: &Contract,
        expected: ContractStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE contracts SET
                payment_authorization_id = $2,
                status = $3,
                validated = $4,
                starts_at = $5,
                ends_at = $6,
                updated_at = $7,
                version = version + 1
            WHERE id = $1 AND status = $8 AND version = $9
            "#,
        )
        .bind(contract.id.as_uuid())
        .bind(&contract.payment_authorization_id)
        .bind(contract.status.as_str())
        .bind(contract.validated)
        .bind(contract.starts_at.map(|t| *t.as_datetime()))
        .bind(contract.ends_at.map(|t| *t.as_datetime()))
        .bind(contract.updated_at.as_datetime())
        .bind(expected.as_str())
        .bind(contract.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(AUTHORIZATION_CONSTRAINT) {
                return DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Payment authorization is linked to another contract",
                )
                .with_detail("current", "authorization in use")
                .with_detail("attempted", "attach a payment authorization");
            }
            db_error("Failed to update contract", e)
        })?;

        if result.rows_affected() == 0 {
            let current: Option<(String,)> =
                sqlx::query_as("SELECT status FROM contracts WHERE id = $1")
                    .bind(contract.id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| db_error("Failed to read contract status", e))?;

            return Err(match current {
                None => DomainError::new(ErrorCode::ContractNotFound, "Contract not found")
                    .with_detail("id", contract.id.to_string()),
                Some((status,)) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    "Contract was modified concurrently",
                )
                .with_detail("current", status)
                .with_detail("attempted", format!("write from {}", expected)),
            });
        }

        Ok(())
    }

    async fn discard_unauthorized(&self, id: &ContractId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM contracts
            WHERE id = $1 AND status = 'pending' AND payment_authorization_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to discard contract", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, DomainError> {
        let row: Option<ContractRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find contract", e))?;

        row.map(Contract::try_from).transpose()
    }

    async fn find_by_authorization_id(
        &self,
        authorization_id: &str,
    ) -> Result<Option<Contract>, DomainError> {
        let row: Option<ContractRow> = sqlx::query_as(&format!(
            "{} WHERE payment_authorization_id = $1",
            SELECT_COLUMNS
        ))
        .bind(authorization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find contract by authorization", e))?;

        row.map(Contract::try_from).transpose()
    }

    async fn find_for_party(&self, party: &UserId) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(&format!(
            "{} WHERE client_id = $1 OR nutritionist_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(party.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contracts", e))?;

        rows_to_contracts(rows)
    }

    async fn find_between(
        &self,
        client_id: &UserId,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(&format!(
            r#"{} WHERE client_id = $1 AND nutritionist_id = $2
                  AND (cardinality($3::text[]) = 0 OR status = ANY($3))
                ORDER BY created_at DESC"#,
            SELECT_COLUMNS
        ))
        .bind(client_id.as_uuid())
        .bind(nutritionist_id.as_uuid())
        .bind(status_names(statuses))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contracts for pair", e))?;

        rows_to_contracts(rows)
    }

    async fn find_by_nutritionist(
        &self,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(&format!(
            r#"{} WHERE nutritionist_id = $1
                  AND (cardinality($2::text[]) = 0 OR status = ANY($2))
                ORDER BY created_at DESC"#,
            SELECT_COLUMNS
        ))
        .bind(nutritionist_id.as_uuid())
        .bind(status_names(statuses))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list nutritionist contracts", e))?;

        rows_to_contracts(rows)
    }

    async fn find_due_for_completion(&self, now: Timestamp) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'active' AND ends_at <= $1",
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contracts due for completion", e))?;

        rows_to_contracts(rows)
    }

    async fn find_pending_created_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'pending' AND created_at < $1 ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list stale pending contracts", e))?;

        rows_to_contracts(rows)
    }
}
