//! # docket-db
//!
//! PostgreSQL database layer for docket.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Case-number generation inside the case-creation transaction
//! - Strategy version history with unified diffs
//!
//! ## Example
//!
//! ```rust,ignore
//! use docket_db::Database;
//! use docket_core::CaseRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/docket").await?;
//!     let cases = db.cases.list().await?;
//!     println!("{} cases", cases.len());
//!     Ok(())
//! }
//! ```

pub mod case_notes;
pub mod cases;
pub mod clients;
pub mod documents;
pub mod pool;
pub mod strategies;

// Re-export core types
pub use docket_core::*;

// Re-export repository implementations
pub use case_notes::PgCaseNoteRepository;
pub use cases::{case_number_prefix, next_case_number, PgCaseRepository};
pub use clients::PgClientRepository;
pub use documents::PgDocumentRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use strategies::PgStrategyRepository;

/// Embedded SQL migrations, applied at startup by the API binary.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Client repository.
    pub clients: PgClientRepository,
    /// Case repository (including the intake transaction).
    pub cases: PgCaseRepository,
    /// Document repository.
    pub documents: PgDocumentRepository,
    /// Case note repository.
    pub notes: PgCaseNoteRepository,
    /// Strategy version repository.
    pub strategies: PgStrategyRepository,
}

impl Database {
    /// Connect to PostgreSQL and build the repository set.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the repository set over an existing pool.
    pub fn from_pool(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            clients: PgClientRepository::new(pool.clone()),
            cases: PgCaseRepository::new(pool.clone()),
            documents: PgDocumentRepository::new(pool.clone()),
            notes: PgCaseNoteRepository::new(pool.clone()),
            strategies: PgStrategyRepository::new(pool.clone()),
            pool,
        }
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))
    }
}
