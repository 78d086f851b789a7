//! Document repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use docket_core::{
    new_v7, CreateDocumentRequest, Document, DocumentRepository, DocumentStoredUpdate, Error,
    Result,
};

const SELECT_COLUMNS: &str = r#"
    id, case_id, title, description, file_name, file_url, file_size,
    mime_type, storage_bucket, storage_key, category, category_rationale,
    metadata, created_at_utc, updated_at_utc
"#;

/// PostgreSQL implementation of DocumentRepository.
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM document WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, req: CreateDocumentRequest) -> Result<Uuid> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO document (id, case_id, title, description, file_name,
                                  file_url, file_size, mime_type, category,
                                  category_rationale, metadata,
                                  created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            "#,
        )
        .bind(id)
        .bind(req.case_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.file_name)
        .bind(&req.file_url)
        .bind(req.file_size)
        .bind(&req.mime_type)
        .bind(&req.category)
        .bind(&req.category_rationale)
        .bind(&req.metadata)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        let query = format!("SELECT {} FROM document WHERE id = $1", SELECT_COLUMNS);
        let document: Option<Document> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        document.ok_or(Error::DocumentNotFound(id))
    }

    async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<Document>> {
        let query = format!(
            "SELECT {} FROM document WHERE case_id = $1 ORDER BY created_at_utc ASC",
            SELECT_COLUMNS
        );
        let documents: Vec<Document> = sqlx::query_as(&query)
            .bind(case_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(documents)
    }

    async fn mark_stored(&self, id: Uuid, update: DocumentStoredUpdate) -> Result<()> {
        if !self.exists(id).await? {
            return Err(Error::DocumentNotFound(id));
        }

        sqlx::query(
            r#"
            UPDATE document
            SET file_url = $1, storage_bucket = $2, storage_key = $3,
                file_size = COALESCE($4, file_size), metadata = $5,
                updated_at_utc = $6
            WHERE id = $7
            "#,
        )
        .bind(&update.file_url)
        .bind(&update.storage_bucket)
        .bind(&update.storage_key)
        .bind(update.file_size)
        .bind(&update.metadata)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn update_metadata(&self, id: Uuid, metadata: JsonValue) -> Result<()> {
        if !self.exists(id).await? {
            return Err(Error::DocumentNotFound(id));
        }

        sqlx::query("UPDATE document SET metadata = $1, updated_at_utc = $2 WHERE id = $3")
            .bind(&metadata)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}
