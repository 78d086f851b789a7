//! Case note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use docket_core::{
    new_v7, CaseNote, CaseNoteRepository, CreateCaseNoteRequest, Error, Result,
    UpdateCaseNoteRequest,
};

/// PostgreSQL implementation of CaseNoteRepository.
pub struct PgCaseNoteRepository {
    pool: Pool<Postgres>,
}

impl PgCaseNoteRepository {
    /// Create a new PgCaseNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseNoteRepository for PgCaseNoteRepository {
    async fn create(&self, req: CreateCaseNoteRequest) -> Result<CaseNote> {
        let note: CaseNote = sqlx::query_as(
            r#"
            INSERT INTO case_note (id, case_id, title, content, created_by,
                                   created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, case_id, title, content, created_by, updated_by,
                      created_at_utc, updated_at_utc
            "#,
        )
        .bind(new_v7())
        .bind(req.case_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(note)
    }

    async fn update(&self, id: Uuid, req: UpdateCaseNoteRequest) -> Result<CaseNote> {
        let note: Option<CaseNote> = sqlx::query_as(
            r#"
            UPDATE case_note
            SET title = $1, content = $2, updated_by = $3, updated_at_utc = $4
            WHERE id = $5
            RETURNING id, case_id, title, content, created_by, updated_by,
                      created_at_utc, updated_at_utc
            "#,
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.updated_by)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        note.ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM case_note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<CaseNote>> {
        let notes: Vec<CaseNote> = sqlx::query_as(
            r#"
            SELECT id, case_id, title, content, created_by, updated_by,
                   created_at_utc, updated_at_utc
            FROM case_note
            WHERE case_id = $1
            ORDER BY created_at_utc DESC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(notes)
    }
}
