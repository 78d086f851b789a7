//! Core data models for docket.
//!
//! These types are shared across all docket crates and represent the
//! case-management domain entities plus the wire shapes exchanged with the
//! ingestion backend and the inference layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;

// =============================================================================
// ENTITIES
// =============================================================================

/// A client (the person or organization a case is opened for).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub metadata: JsonValue,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// A legal case. Owns documents, notes, and strategy versions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Case {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub client_id: Uuid,
    pub assigned_to: Option<String>,
    pub metadata: JsonValue,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Lightweight case listing row (sidebar view).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaseSummary {
    pub id: Uuid,
    pub title: String,
    pub case_number: String,
    pub status: String,
    pub client_name: String,
    pub created_at_utc: DateTime<Utc>,
}

/// A case with all related records, as returned by the case detail read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFull {
    #[serde(flatten)]
    pub case: Case,
    pub client: Client,
    /// Documents in creation order.
    pub documents: Vec<Document>,
    /// Notes, newest first.
    pub notes: Vec<CaseNote>,
    /// Strategy versions, highest version first.
    pub strategies: Vec<StrategyVersionSummary>,
}

/// An uploaded or linked document attached to a case.
///
/// The row is created before the physical upload starts so its id can serve
/// as the correlation key for the ingestion backend; `file_url` stays empty
/// until the upload completes. `metadata` holds a serialized
/// [`DocumentLifecycle`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: String,
    pub storage_bucket: Option<String>,
    pub storage_key: Option<String>,
    pub category: Option<String>,
    pub category_rationale: Option<String>,
    pub metadata: JsonValue,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// A free-text note on a case. Independently editable, not versioned.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaseNote {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// One immutable version in a case's append-only strategy chain.
///
/// For a given case, version numbers start at 1 and increase without gaps
/// under a single writer; the current strategy is the row with the maximum
/// version. `metadata` holds a serialized [`StrategyProvenance`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaseStrategy {
    pub id: Uuid,
    pub case_id: Uuid,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub generation_reason: String,
    pub model: String,
    pub metadata: JsonValue,
    pub created_at_utc: DateTime<Utc>,
}

/// Strategy version listing row (without full content).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StrategyVersionSummary {
    pub id: Uuid,
    pub version: i32,
    pub title: String,
    pub summary: String,
    pub generation_reason: String,
    pub model: String,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// EXTRACTION TYPES
// =============================================================================

/// A single structured field pulled out of a document by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Technical field name (camelCase, e.g. "firstName", "phoneNumber").
    pub field_name: String,
    pub field_value: String,
    /// User-facing display label (e.g. "First Name").
    pub label: String,
}

/// Per-file categorization produced during intake, passed alongside uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCategoryHint {
    pub file_name: String,
    pub category: String,
    pub confidence: f64,
    pub rationale: String,
}

/// Raw document handed to the extraction service.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Structured record returned by document extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDetails {
    pub case_title: String,
    pub document_category: String,
    pub category_rationale: String,
    #[serde(default)]
    pub extracted_fields: Vec<ExtractedField>,
}

/// Base64-encoded media handed to a multimodal generation backend.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub media_type: String,
    pub data_base64: String,
}

// =============================================================================
// DOCUMENT METADATA (tagged lifecycle)
// =============================================================================

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Uploaded file bytes.
    Upload,
    /// Reference-only link; content was never fetched.
    UrlReference { url: String },
    /// Link whose content was scraped and ingested.
    UrlFetched {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        content_size: Option<i64>,
    },
}

/// Model analysis recorded on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub category: Option<String>,
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted_fields: Vec<ExtractedField>,
    pub extracted_at: DateTime<Utc>,
}

/// Durable storage location reported by the ingestion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Chunking/processing stats reported by the ingestion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    pub chunks_created: i64,
    pub documents_processed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub processed_at: DateTime<Utc>,
}

/// Document upload lifecycle, stored in the document metadata column.
///
/// Replaces the original's open-shape JSON blob with an explicit enumeration
/// of the known states: `pending -> completed | failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentLifecycle {
    Pending {
        source: DocumentSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        analysis: Option<AiAnalysis>,
    },
    Completed {
        source: DocumentSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        analysis: Option<AiAnalysis>,
        #[serde(skip_serializing_if = "Option::is_none")]
        storage: Option<StorageInfo>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ingest: Option<IngestStats>,
    },
    Failed {
        source: DocumentSource,
        error: String,
    },
}

impl DocumentLifecycle {
    /// Serialize for storage in the metadata column.
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Parse from a stored metadata column.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentLifecycle::Failed { .. })
    }
}

// =============================================================================
// STRATEGY METADATA (tagged provenance)
// =============================================================================

/// Format of manually supplied strategy content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Markdown,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Markdown => "markdown",
            ContentType::Html => "html",
        }
    }
}

/// Snapshot of the inputs a strategy version was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyContext {
    pub case: CaseBrief,
    pub client: ClientBrief,
    pub documents: Vec<DocumentBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_strategy: Option<StrategyBrief>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBrief {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBrief {
    pub name: String,
    pub email: Option<String>,
}

/// Per-document summary fed into strategy generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBrief {
    pub title: String,
    pub file_name: String,
    pub category: Option<String>,
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyBrief {
    pub content: String,
    pub summary: String,
    pub version: i32,
}

/// How a strategy version came to exist, stored in its metadata column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum StrategyProvenance {
    Generated {
        documents_analyzed: usize,
        context: StrategyContext,
        /// Set when document text was unavailable and generation fell back
        /// to database metadata only.
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
        generated_at: DateTime<Utc>,
    },
    ManualEdit {
        /// Version number this edit started from.
        edited_from: i32,
        content_type: ContentType,
        edited_at: DateTime<Utc>,
    },
}

impl StrategyProvenance {
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    pub fn from_value(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

// =============================================================================
// INTAKE PROVENANCE
// =============================================================================

/// Provenance recorded on a client row created by AI intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProvenance {
    pub source: String,
    pub extracted_fields: Vec<ExtractedField>,
    pub extracted_at: DateTime<Utc>,
}

/// Full extraction payload recorded on a case row for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseProvenance {
    pub document_category: String,
    pub category_rationale: String,
    pub extracted_fields: Vec<ExtractedField>,
    pub categories: Vec<DocumentCategoryHint>,
    pub extracted_at: DateTime<Utc>,
}

// =============================================================================
// WORKFLOW INPUT/OUTPUT
// =============================================================================

/// Input to the case-creation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseInput {
    pub case_title: String,
    pub document_category: String,
    pub category_rationale: String,
    pub extracted_fields: Vec<ExtractedField>,
    #[serde(default)]
    pub categories: Vec<DocumentCategoryHint>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Identifiers produced by the case-creation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub case_id: Uuid,
    pub client_id: Uuid,
}

/// An in-memory file handed to the upload pipeline.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    /// Declared content type; sniffed from magic bytes when absent.
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// A URL handed to the link-document pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlDocumentInput {
    pub url: String,
    pub fetch_content: bool,
}

/// Per-file outcome of the upload pipeline.
///
/// One entry per input file; a failed file never aborts its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Succeeded {
        file_name: String,
        document_id: Uuid,
        category: Option<String>,
        chunks_created: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Failed {
        file_name: String,
        error: String,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Succeeded { file_name, .. } => file_name,
            FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Succeeded { .. })
    }
}

/// Per-URL outcome of the link-document pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlOutcome {
    Succeeded { url: String, document_id: Uuid },
    Failed { url: String, error: String },
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UrlOutcome::Succeeded { .. })
    }
}

/// Result of an upload batch. `results` has one entry per input file, in
/// input order; `document_ids` includes rows created for files that later
/// failed partway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub document_ids: Vec<Uuid>,
    pub results: Vec<FileOutcome>,
}

// =============================================================================
// INGESTION BACKEND WIRE TYPES
// =============================================================================

/// Result of uploading a file to the ingestion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub file_url: Option<String>,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub chunks_created: i64,
    pub documents_processed: i64,
    pub warning: Option<String>,
}

/// Result of a scrape-and-ingest call for a URL document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReceipt {
    pub url: String,
    pub storage_url: Option<String>,
    pub content_size: Option<i64>,
    pub chunks_created: i64,
    pub documents_processed: i64,
    pub warning: Option<String>,
}

/// One ingested document's text, as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedDocument {
    pub filename: String,
    pub content: String,
    pub chunk_count: i64,
    pub upload_timestamp: String,
    pub case_document_id: Option<String>,
}

/// Full text of all documents for a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseText {
    pub case_id: String,
    pub total_documents: i64,
    pub documents: Vec<IngestedDocument>,
    pub markdown_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lifecycle_round_trip() {
        let lifecycle = DocumentLifecycle::Completed {
            source: DocumentSource::Upload,
            analysis: Some(AiAnalysis {
                category: Some("Contracts".to_string()),
                rationale: Some("Employment agreement".to_string()),
                confidence: Some(0.9),
                extracted_fields: vec![],
                extracted_at: Utc::now(),
            }),
            storage: None,
            ingest: None,
        };

        let value = lifecycle.to_value();
        assert_eq!(value["status"], "completed");
        let parsed = DocumentLifecycle::from_value(&value).unwrap();
        assert_eq!(parsed, lifecycle);
    }

    #[test]
    fn test_document_lifecycle_failed_tag() {
        let lifecycle = DocumentLifecycle::Failed {
            source: DocumentSource::Upload,
            error: "upload refused".to_string(),
        };
        let value = lifecycle.to_value();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "upload refused");
        assert!(lifecycle.is_failed());
    }

    #[test]
    fn test_url_source_serialization() {
        let source = DocumentSource::UrlFetched {
            url: "https://example.com/page".to_string(),
            content_size: Some(1024),
        };
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["kind"], "url_fetched");
        assert_eq!(value["content_size"], 1024);
    }

    #[test]
    fn test_strategy_provenance_manual_edit_content_type() {
        let provenance = StrategyProvenance::ManualEdit {
            edited_from: 2,
            content_type: ContentType::Html,
            edited_at: Utc::now(),
        };
        let value = provenance.to_value();
        assert_eq!(value["origin"], "manual_edit");
        assert_eq!(value["content_type"], "html");

        let parsed = StrategyProvenance::from_value(&value).unwrap();
        match parsed {
            StrategyProvenance::ManualEdit { content_type, .. } => {
                assert_eq!(content_type, ContentType::Html);
            }
            _ => panic!("Expected ManualEdit"),
        }
    }

    #[test]
    fn test_content_type_as_str() {
        assert_eq!(ContentType::Markdown.as_str(), "markdown");
        assert_eq!(ContentType::Html.as_str(), "html");
    }

    #[test]
    fn test_file_outcome_accessors() {
        let ok = FileOutcome::Succeeded {
            file_name: "a.pdf".to_string(),
            document_id: Uuid::new_v4(),
            category: Some("Evidence".to_string()),
            chunks_created: Some(12),
            warning: None,
        };
        let failed = FileOutcome::Failed {
            file_name: "b.pdf".to_string(),
            error: "boom".to_string(),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert_eq!(ok.file_name(), "a.pdf");
        assert_eq!(failed.file_name(), "b.pdf");
    }

    #[test]
    fn test_extracted_details_defaults_fields() {
        let details: ExtractedDetails = serde_json::from_str(
            r#"{"case_title":"T","document_category":"Identity","category_rationale":"r"}"#,
        )
        .unwrap();
        assert!(details.extracted_fields.is_empty());
    }
}
