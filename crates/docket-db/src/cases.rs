//! Case repository implementation, including case-number generation.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sqlx::{Pool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use docket_core::{
    defaults, new_v7, Case, CaseFull, CaseRepository, CaseSummary, CreateCaseRecord, Error,
    NewCase, Result, StrategyVersionSummary,
};

/// Build the case-number prefix for a calendar year: `CASE-<year>-`.
pub fn case_number_prefix(year: i32) -> String {
    format!("{}-{}-", defaults::CASE_NUMBER_PREFIX, year)
}

/// Compute the next case number given the lexicographically maximal existing
/// number for the prefix (or `None` if the year has no cases yet).
///
/// An unparsable suffix restarts the sequence at 1; the unique constraint on
/// `case_number` catches any resulting collision.
pub fn next_case_number(prefix: &str, latest: Option<&str>) -> String {
    let next = latest
        .and_then(|n| n.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);

    format!(
        "{}{:0width$}",
        prefix,
        next,
        width = defaults::CASE_NUMBER_PAD
    )
}

/// PostgreSQL implementation of CaseRepository.
pub struct PgCaseRepository {
    pool: Pool<Postgres>,
}

impl PgCaseRepository {
    /// Create a new PgCaseRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate the next case number for the current year, inside the
    /// caller's transaction.
    async fn generate_case_number_tx(tx: &mut Transaction<'_, Postgres>) -> Result<String> {
        let prefix = case_number_prefix(Utc::now().year());

        let latest: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT case_number FROM legal_case
            WHERE case_number LIKE $1 || '%'
            ORDER BY case_number DESC
            LIMIT 1
            "#,
        )
        .bind(&prefix)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(next_case_number(
            &prefix,
            latest.as_ref().map(|r| r.0.as_str()),
        ))
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    async fn create_with_client(&self, req: CreateCaseRecord) -> Result<NewCase> {
        let now = Utc::now();
        let client_id = new_v7();
        let case_id = new_v7();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            r#"
            INSERT INTO client (id, name, email, phone, address, metadata,
                                created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(client_id)
        .bind(&req.client.name)
        .bind(&req.client.email)
        .bind(&req.client.phone)
        .bind(&req.client.address)
        .bind(&req.client.metadata)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let case_number = Self::generate_case_number_tx(&mut tx).await?;

        sqlx::query(
            r#"
            INSERT INTO legal_case (id, case_number, title, description, status,
                                    client_id, assigned_to, metadata,
                                    created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            "#,
        )
        .bind(case_id)
        .bind(&case_number)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.status)
        .bind(client_id)
        .bind(&req.assigned_to)
        .bind(&req.metadata)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "cases",
            op = "create_with_client",
            case_id = %case_id,
            client_id = %client_id,
            case_number = %case_number,
            "Created case"
        );

        Ok(NewCase { case_id, client_id })
    }

    async fn fetch(&self, id: Uuid) -> Result<Case> {
        let case: Option<Case> = sqlx::query_as(
            r#"
            SELECT id, case_number, title, description, status, client_id,
                   assigned_to, metadata, created_at_utc, updated_at_utc
            FROM legal_case
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        case.ok_or(Error::CaseNotFound(id))
    }

    async fn fetch_full(&self, id: Uuid) -> Result<CaseFull> {
        let case = self.fetch(id).await?;

        let client: docket_core::Client = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, address, metadata,
                   created_at_utc, updated_at_utc, updated_by
            FROM client
            WHERE id = $1
            "#,
        )
        .bind(case.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let documents: Vec<docket_core::Document> = sqlx::query_as(
            r#"
            SELECT id, case_id, title, description, file_name, file_url,
                   file_size, mime_type, storage_bucket, storage_key,
                   category, category_rationale, metadata,
                   created_at_utc, updated_at_utc
            FROM document
            WHERE case_id = $1
            ORDER BY created_at_utc ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let notes: Vec<docket_core::CaseNote> = sqlx::query_as(
            r#"
            SELECT id, case_id, title, content, created_by, updated_by,
                   created_at_utc, updated_at_utc
            FROM case_note
            WHERE case_id = $1
            ORDER BY created_at_utc DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let strategies: Vec<StrategyVersionSummary> = sqlx::query_as(
            r#"
            SELECT id, version, title, summary, generation_reason, model,
                   created_at_utc
            FROM case_strategy
            WHERE case_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(CaseFull {
            case,
            client,
            documents,
            notes,
            strategies,
        })
    }

    async fn list(&self) -> Result<Vec<CaseSummary>> {
        let cases: Vec<CaseSummary> = sqlx::query_as(
            r#"
            SELECT lc.id, lc.title, lc.case_number, lc.status,
                   c.name AS client_name, lc.created_at_utc
            FROM legal_case lc
            JOIN client c ON c.id = lc.client_id
            ORDER BY lc.created_at_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(cases)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM legal_case WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.is_some())
    }
}
