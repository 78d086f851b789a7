//! Client repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use docket_core::{Client, ClientRepository, Error, Result, UpdateClientRequest};

/// PostgreSQL implementation of ClientRepository.
///
/// Client rows are created by the case-intake transaction (see
/// [`crate::PgCaseRepository`]); this repository covers reads and the
/// explicit edit action.
pub struct PgClientRepository {
    pool: Pool<Postgres>,
}

impl PgClientRepository {
    /// Create a new PgClientRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn fetch(&self, id: Uuid) -> Result<Client> {
        let client: Option<Client> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, address, metadata,
                   created_at_utc, updated_at_utc, updated_by
            FROM client
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        client.ok_or_else(|| Error::NotFound(format!("Client {} not found", id)))
    }

    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<Client> {
        let client: Option<Client> = sqlx::query_as(
            r#"
            UPDATE client
            SET name = $1, email = $2, phone = $3, address = $4,
                updated_by = $5, updated_at_utc = $6
            WHERE id = $7
            RETURNING id, name, email, phone, address, metadata,
                      created_at_utc, updated_at_utc, updated_by
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.address)
        .bind(&req.updated_by)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        client.ok_or_else(|| Error::NotFound(format!("Client {} not found", id)))
    }
}
