//! Document pipelines: file upload + extraction, and URL-based documents.
//!
//! Both pipelines isolate failures per item: a file or URL that fails is
//! recorded as a failed outcome and never aborts its siblings.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use docket_core::{
    defaults, AiAnalysis, CaseRepository, CreateDocumentRequest, Document, DocumentBatch,
    DocumentCategoryHint, DocumentLifecycle, DocumentPayload, DocumentRepository, DocumentSource,
    DocumentStoredUpdate, Error, ExtractionBackend, FileOutcome, FileUpload, IngestBackend,
    IngestStats, Result, StorageInfo, UrlDocumentInput, UrlOutcome,
};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Resolve a file's MIME type: the declared type when present, otherwise
/// sniffed from magic bytes.
fn resolve_mime(file: &FileUpload) -> String {
    if let Some(mime) = &file.mime_type {
        if !mime.is_empty() {
            return mime.clone();
        }
    }
    infer::get(&file.data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// Document upload and URL pipelines.
pub struct DocumentPipeline {
    cases: Arc<dyn CaseRepository>,
    documents: Arc<dyn DocumentRepository>,
    ingest: Arc<dyn IngestBackend>,
    extraction: Arc<dyn ExtractionBackend>,
}

impl DocumentPipeline {
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        documents: Arc<dyn DocumentRepository>,
        ingest: Arc<dyn IngestBackend>,
        extraction: Arc<dyn ExtractionBackend>,
    ) -> Self {
        Self {
            cases,
            documents,
            ingest,
            extraction,
        }
    }

    /// Upload a batch of files to a case.
    ///
    /// Files and hints are paired by position. Each file gets a pending
    /// Document row before the physical upload so its id can serve as the
    /// correlation key; the returned batch carries one outcome per file in
    /// input order and every created document id, failed files included.
    pub async fn upload_files(
        &self,
        case_id: Uuid,
        files: Vec<FileUpload>,
        hints: Vec<DocumentCategoryHint>,
    ) -> Result<DocumentBatch> {
        if !self.cases.exists(case_id).await? {
            return Err(Error::CaseNotFound(case_id));
        }

        let mut document_ids = Vec::new();
        let mut results = Vec::new();

        for (i, file) in files.iter().enumerate() {
            let hint = hints.get(i);

            let document_id = match self.create_pending(case_id, file, hint).await {
                Ok(id) => id,
                Err(e) => {
                    warn!(
                        subsystem = "workflow",
                        component = "documents",
                        op = "upload_files",
                        case_id = %case_id,
                        file_name = %file.file_name,
                        error_msg = %e,
                        "Failed to create document row"
                    );
                    results.push(FileOutcome::Failed {
                        file_name: file.file_name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            document_ids.push(document_id);

            match self.process_file(case_id, document_id, file, hint).await {
                Ok(outcome) => results.push(outcome),
                Err(e) => {
                    warn!(
                        subsystem = "workflow",
                        component = "documents",
                        op = "upload_files",
                        case_id = %case_id,
                        document_id = %document_id,
                        file_name = %file.file_name,
                        error_msg = %e,
                        "File processing failed"
                    );
                    self.mark_failed(document_id, DocumentSource::Upload, &e)
                        .await;
                    results.push(FileOutcome::Failed {
                        file_name: file.file_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            subsystem = "workflow",
            component = "documents",
            op = "upload_files",
            case_id = %case_id,
            result_count = results.len(),
            success = results.iter().filter(|r| r.is_success()).count(),
            "Upload batch complete"
        );

        Ok(DocumentBatch {
            document_ids,
            results,
        })
    }

    /// Create the pending Document row for a file.
    async fn create_pending(
        &self,
        case_id: Uuid,
        file: &FileUpload,
        hint: Option<&DocumentCategoryHint>,
    ) -> Result<Uuid> {
        let lifecycle = DocumentLifecycle::Pending {
            source: DocumentSource::Upload,
            analysis: hint.map(|h| AiAnalysis {
                category: Some(h.category.clone()),
                rationale: Some(h.rationale.clone()),
                confidence: Some(h.confidence),
                extracted_fields: vec![],
                extracted_at: Utc::now(),
            }),
        };

        self.documents
            .create(CreateDocumentRequest {
                case_id,
                title: hint
                    .map(|h| h.file_name.clone())
                    .unwrap_or_else(|| file.file_name.clone()),
                description: hint.map(|h| {
                    format!("Document categorized as: {}. {}", h.category, h.rationale)
                }),
                file_name: file.file_name.clone(),
                file_url: String::new(),
                file_size: Some(file.data.len() as i64),
                mime_type: resolve_mime(file),
                category: hint.map(|h| h.category.clone()),
                category_rationale: hint.map(|h| h.rationale.clone()),
                metadata: lifecycle.to_value(),
            })
            .await
    }

    /// Upload, extract, and finalize a single file. Any error here moves the
    /// Document to `Failed`.
    async fn process_file(
        &self,
        case_id: Uuid,
        document_id: Uuid,
        file: &FileUpload,
        hint: Option<&DocumentCategoryHint>,
    ) -> Result<FileOutcome> {
        let receipt = self.ingest.upload(file, case_id, Some(document_id)).await?;

        let payload = DocumentPayload {
            name: file.file_name.clone(),
            mime_type: resolve_mime(file),
            data: file.data.clone(),
        };
        let details = self.extraction.extract(&payload).await?;

        // Upload-time hint wins over extraction when both exist.
        let category = hint
            .map(|h| h.category.clone())
            .unwrap_or_else(|| details.document_category.clone());
        let rationale = hint
            .map(|h| h.rationale.clone())
            .unwrap_or_else(|| details.category_rationale.clone());
        let confidence = hint.map(|h| h.confidence).unwrap_or(1.0);

        let now = Utc::now();
        let lifecycle = DocumentLifecycle::Completed {
            source: DocumentSource::Upload,
            analysis: Some(AiAnalysis {
                category: Some(category.clone()),
                rationale: Some(rationale),
                confidence: Some(confidence),
                extracted_fields: details.extracted_fields,
                extracted_at: now,
            }),
            storage: Some(StorageInfo {
                bucket: receipt.bucket.clone(),
                key: receipt.key.clone(),
                uploaded_at: now,
            }),
            ingest: Some(IngestStats {
                chunks_created: receipt.chunks_created,
                documents_processed: receipt.documents_processed,
                warning: receipt.warning.clone(),
                processed_at: now,
            }),
        };

        self.documents
            .mark_stored(
                document_id,
                DocumentStoredUpdate {
                    file_url: receipt.file_url.clone().unwrap_or_default(),
                    storage_bucket: receipt.bucket,
                    storage_key: receipt.key,
                    file_size: None,
                    metadata: lifecycle.to_value(),
                },
            )
            .await?;

        Ok(FileOutcome::Succeeded {
            file_name: file.file_name.clone(),
            document_id,
            category: Some(category),
            chunks_created: Some(receipt.chunks_created),
            warning: receipt.warning,
        })
    }

    /// Add URL-based documents to a case, one outcome per URL.
    pub async fn add_urls(
        &self,
        case_id: Uuid,
        urls: Vec<UrlDocumentInput>,
    ) -> Result<Vec<UrlOutcome>> {
        if !self.cases.exists(case_id).await? {
            return Err(Error::CaseNotFound(case_id));
        }

        let mut results = Vec::new();

        for entry in urls {
            match self.process_url(case_id, &entry).await {
                Ok(document_id) => results.push(UrlOutcome::Succeeded {
                    url: entry.url,
                    document_id,
                }),
                Err(e) => {
                    warn!(
                        subsystem = "workflow",
                        component = "documents",
                        op = "add_urls",
                        case_id = %case_id,
                        url = %entry.url,
                        error_msg = %e,
                        "URL processing failed"
                    );
                    results.push(UrlOutcome::Failed {
                        url: entry.url,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(results)
    }

    async fn process_url(&self, case_id: Uuid, entry: &UrlDocumentInput) -> Result<Uuid> {
        let parsed = url::Url::parse(&entry.url)
            .map_err(|e| Error::InvalidInput(format!("Invalid URL '{}': {}", entry.url, e)))?;

        let source = if entry.fetch_content {
            DocumentSource::UrlFetched {
                url: entry.url.clone(),
                content_size: None,
            }
        } else {
            DocumentSource::UrlReference {
                url: entry.url.clone(),
            }
        };

        let document_id = self
            .documents
            .create(CreateDocumentRequest {
                case_id,
                title: parsed.host_str().unwrap_or(&entry.url).to_string(),
                description: Some(format!("Document from {}", entry.url)),
                file_name: entry.url.clone(),
                file_url: entry.url.clone(),
                file_size: None,
                mime_type: "text/html".to_string(),
                category: Some(defaults::WEB_LINK_CATEGORY.to_string()),
                category_rationale: Some("URL-based document".to_string()),
                metadata: DocumentLifecycle::Pending {
                    source: source.clone(),
                    analysis: None,
                }
                .to_value(),
            })
            .await?;

        if entry.fetch_content {
            let receipt = match self
                .ingest
                .scrape_and_upload(&entry.url, case_id, true, Some(document_id))
                .await
            {
                Ok(receipt) => receipt,
                Err(e) => {
                    self.mark_failed(document_id, source, &e).await;
                    return Err(e);
                }
            };

            let fetched = DocumentSource::UrlFetched {
                url: entry.url.clone(),
                content_size: receipt.content_size,
            };
            let lifecycle = DocumentLifecycle::Completed {
                source: fetched,
                analysis: None,
                storage: None,
                ingest: Some(IngestStats {
                    chunks_created: receipt.chunks_created,
                    documents_processed: receipt.documents_processed,
                    warning: receipt.warning,
                    processed_at: Utc::now(),
                }),
            };

            self.documents
                .mark_stored(
                    document_id,
                    DocumentStoredUpdate {
                        file_url: receipt.storage_url.unwrap_or_else(|| entry.url.clone()),
                        storage_bucket: None,
                        storage_key: None,
                        file_size: receipt.content_size,
                        metadata: lifecycle.to_value(),
                    },
                )
                .await?;
        } else {
            // Reference-only link: complete immediately, nothing to fetch.
            let lifecycle = DocumentLifecycle::Completed {
                source,
                analysis: None,
                storage: None,
                ingest: None,
            };
            self.documents
                .update_metadata(document_id, lifecycle.to_value())
                .await?;
        }

        Ok(document_id)
    }

    /// Move a Document to the `Failed` lifecycle state. A failure here is
    /// logged but not surfaced; the original error is the one that matters.
    async fn mark_failed(&self, document_id: Uuid, source: DocumentSource, error: &Error) {
        let lifecycle = DocumentLifecycle::Failed {
            source,
            error: error.to_string(),
        };
        if let Err(update_err) = self
            .documents
            .update_metadata(document_id, lifecycle.to_value())
            .await
        {
            warn!(
                subsystem = "workflow",
                component = "documents",
                op = "mark_failed",
                document_id = %document_id,
                error_msg = %update_err,
                "Failed to record document failure"
            );
        }
    }
}

/// Fetch a document's parsed lifecycle from its metadata column.
pub fn document_lifecycle(document: &Document) -> Result<DocumentLifecycle> {
    DocumentLifecycle::from_value(&document.metadata)
}
