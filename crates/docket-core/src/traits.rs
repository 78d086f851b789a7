//! Core traits for docket abstractions.
//!
//! These traits define the seams between the orchestration layer and its
//! dependencies (database repositories, the ingestion backend, the model
//! backends), enabling pluggable implementations and testability.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REPOSITORY REQUEST TYPES
// =============================================================================

/// Client row created as part of case intake.
#[derive(Debug, Clone)]
pub struct NewClientRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub metadata: JsonValue,
}

/// Request for the transactional client+case creation.
///
/// The case number is generated inside the same transaction.
#[derive(Debug, Clone)]
pub struct CreateCaseRecord {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub metadata: JsonValue,
    pub client: NewClientRecord,
}

/// Request for creating a document row (before the physical upload).
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub case_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: String,
    pub category: Option<String>,
    pub category_rationale: Option<String>,
    pub metadata: JsonValue,
}

/// Storage location written back once an upload completes.
#[derive(Debug, Clone)]
pub struct DocumentStoredUpdate {
    pub file_url: String,
    pub storage_bucket: Option<String>,
    pub storage_key: Option<String>,
    pub file_size: Option<i64>,
    pub metadata: JsonValue,
}

/// Request for creating a case note.
#[derive(Debug, Clone)]
pub struct CreateCaseNoteRequest {
    pub case_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub created_by: Option<String>,
}

/// Request for updating a case note.
#[derive(Debug, Clone)]
pub struct UpdateCaseNoteRequest {
    pub title: Option<String>,
    pub content: String,
    pub updated_by: Option<String>,
}

/// Request for updating client contact information.
#[derive(Debug, Clone)]
pub struct UpdateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub updated_by: Option<String>,
}

/// Request for appending a strategy version.
///
/// The caller allocates `version` (current max + 1); the store enforces
/// uniqueness of `(case_id, version)` so a concurrent allocation surfaces
/// as a write failure rather than a silent shadow.
#[derive(Debug, Clone)]
pub struct CreateStrategyVersion {
    pub case_id: Uuid,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub generation_reason: String,
    pub model: String,
    pub metadata: JsonValue,
}

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for client rows.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Fetch a client by id.
    async fn fetch(&self, id: Uuid) -> Result<Client>;

    /// Update contact fields on a client.
    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<Client>;
}

/// Repository for cases.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Create a client and its case atomically, generating the case number
    /// inside the same transaction. Either both rows exist afterwards or
    /// neither does.
    async fn create_with_client(&self, req: CreateCaseRecord) -> Result<NewCase>;

    /// Fetch a bare case row.
    async fn fetch(&self, id: Uuid) -> Result<Case>;

    /// Fetch a case with client, documents, notes, and strategy versions.
    async fn fetch_full(&self, id: Uuid) -> Result<CaseFull>;

    /// List all cases, newest first.
    async fn list(&self) -> Result<Vec<CaseSummary>>;

    /// Check if a case exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

/// Repository for documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document row and return its id.
    async fn create(&self, req: CreateDocumentRequest) -> Result<Uuid>;

    /// Fetch a document by id.
    async fn fetch(&self, id: Uuid) -> Result<Document>;

    /// List a case's documents in creation order.
    async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<Document>>;

    /// Record the storage location and final metadata after upload.
    async fn mark_stored(&self, id: Uuid, update: DocumentStoredUpdate) -> Result<()>;

    /// Replace the metadata column (lifecycle transitions).
    async fn update_metadata(&self, id: Uuid, metadata: JsonValue) -> Result<()>;
}

/// Repository for case notes.
#[async_trait]
pub trait CaseNoteRepository: Send + Sync {
    async fn create(&self, req: CreateCaseNoteRequest) -> Result<CaseNote>;

    async fn update(&self, id: Uuid, req: UpdateCaseNoteRequest) -> Result<CaseNote>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List a case's notes, newest first.
    async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<CaseNote>>;
}

/// Repository for the append-only strategy version chain.
#[async_trait]
pub trait StrategyRepository: Send + Sync {
    /// The current strategy: the row with the maximum version for the case.
    async fn current(&self, case_id: Uuid) -> Result<Option<CaseStrategy>>;

    /// Append a version. Fails if `(case_id, version)` already exists.
    async fn create_version(&self, req: CreateStrategyVersion) -> Result<CaseStrategy>;

    /// List versions for a case, highest version first.
    async fn list_versions(&self, case_id: Uuid) -> Result<Vec<StrategyVersionSummary>>;

    /// Fetch a specific version.
    async fn get_version(&self, case_id: Uuid, version: i32) -> Result<Option<CaseStrategy>>;
}

// =============================================================================
// EXTERNAL BACKEND TRAITS
// =============================================================================

/// Text generation backend (LLM invocation).
///
/// A single synchronous call taking a system prompt and a user prompt and
/// returning free text. Used for both document extraction and strategy
/// synthesis; the two differ only in prompt and response schema.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text from a system prompt and user prompt.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate text with an attached document (image or PDF) for
    /// multimodal models.
    async fn generate_with_attachment(
        &self,
        system: &str,
        prompt: &str,
        attachment: &MediaAttachment,
    ) -> Result<String>;

    /// Identifier of the underlying model, recorded on generated artifacts.
    fn model_name(&self) -> &str;
}

/// Document extraction service: raw file in, structured record out.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn extract(&self, payload: &DocumentPayload) -> Result<ExtractedDetails>;
}

/// The external ingestion backend (durable storage + text chunking).
#[async_trait]
pub trait IngestBackend: Send + Sync {
    /// Upload file bytes, keyed by case and (optionally) document id.
    async fn upload(
        &self,
        file: &FileUpload,
        case_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<IngestReceipt>;

    /// Scrape a URL's content and ingest it.
    async fn scrape_and_upload(
        &self,
        url: &str,
        case_id: Uuid,
        fetch_content: bool,
        document_id: Option<Uuid>,
    ) -> Result<ScrapeReceipt>;

    /// Retrieve the full text of a case's ingested documents.
    async fn case_documents(&self, case_id: Uuid, document_id: Option<Uuid>) -> Result<CaseText>;
}
