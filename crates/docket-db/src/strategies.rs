//! Strategy version repository: an append-only version chain per case.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use docket_core::{
    new_v7, CaseStrategy, CreateStrategyVersion, Error, Result, StrategyRepository,
    StrategyVersionSummary,
};

const SELECT_COLUMNS: &str = r#"
    id, case_id, version, title, content, summary, generation_reason,
    model, metadata, created_at_utc
"#;

/// PostgreSQL implementation of StrategyRepository.
///
/// Versions are never updated or deleted; every change is a new row at the
/// next version number. `(case_id, version)` carries a unique constraint, so
/// two writers racing to the same version produce a constraint violation on
/// the second insert instead of a silent shadow.
pub struct PgStrategyRepository {
    pool: Pool<Postgres>,
}

impl PgStrategyRepository {
    /// Create a new PgStrategyRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a unified diff between two versions of a case's strategy.
    pub async fn diff_versions(
        &self,
        case_id: Uuid,
        from_version: i32,
        to_version: i32,
    ) -> Result<String> {
        let from = self
            .get_version(case_id, from_version)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Version {} not found", from_version)))?;

        let to = self
            .get_version(case_id, to_version)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Version {} not found", to_version)))?;

        let diff = similar::TextDiff::from_lines(&from.content, &to.content);
        let mut output = String::new();

        output.push_str(&format!("--- version {}\n", from_version));
        output.push_str(&format!("+++ version {}\n", to_version));

        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                similar::ChangeTag::Delete => "-",
                similar::ChangeTag::Insert => "+",
                similar::ChangeTag::Equal => " ",
            };
            output.push_str(&format!("{}{}", sign, change));
        }

        Ok(output)
    }
}

#[async_trait]
impl StrategyRepository for PgStrategyRepository {
    async fn current(&self, case_id: Uuid) -> Result<Option<CaseStrategy>> {
        let query = format!(
            "SELECT {} FROM case_strategy WHERE case_id = $1 ORDER BY version DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let strategy: Option<CaseStrategy> = sqlx::query_as(&query)
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(strategy)
    }

    async fn create_version(&self, req: CreateStrategyVersion) -> Result<CaseStrategy> {
        let query = format!(
            r#"
            INSERT INTO case_strategy (id, case_id, version, title, content,
                                       summary, generation_reason, model,
                                       metadata, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let strategy: CaseStrategy = sqlx::query_as(&query)
            .bind(new_v7())
            .bind(req.case_id)
            .bind(req.version)
            .bind(&req.title)
            .bind(&req.content)
            .bind(&req.summary)
            .bind(&req.generation_reason)
            .bind(&req.model)
            .bind(&req.metadata)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(strategy)
    }

    async fn list_versions(&self, case_id: Uuid) -> Result<Vec<StrategyVersionSummary>> {
        let versions: Vec<StrategyVersionSummary> = sqlx::query_as(
            r#"
            SELECT id, version, title, summary, generation_reason, model,
                   created_at_utc
            FROM case_strategy
            WHERE case_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(versions)
    }

    async fn get_version(&self, case_id: Uuid, version: i32) -> Result<Option<CaseStrategy>> {
        let query = format!(
            "SELECT {} FROM case_strategy WHERE case_id = $1 AND version = $2",
            SELECT_COLUMNS
        );
        let strategy: Option<CaseStrategy> = sqlx::query_as(&query)
            .bind(case_id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(strategy)
    }
}
