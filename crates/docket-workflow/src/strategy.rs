//! Strategy orchestrator: AI generation and manual edits over the
//! append-only version chain.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use docket_core::{
    defaults, CaseBrief, CaseRepository, CaseStrategy, ClientBrief, ClientRepository, ContentType,
    CreateStrategyVersion, DocumentBrief, DocumentRepository, GenerationBackend, IngestBackend,
    Result, StrategyBrief, StrategyContext, StrategyProvenance, StrategyRepository,
};
use docket_inference::prompts;

/// Warning recorded when document text could not be fetched and generation
/// fell back to database metadata only.
const CONTENT_UNAVAILABLE_WARNING: &str =
    "Document content unavailable due to backend API error";

/// Manual strategy edit request.
#[derive(Debug, Clone)]
pub struct EditStrategyInput {
    pub content: String,
    pub title: Option<String>,
    pub previous_version: Option<i32>,
    pub content_type: ContentType,
}

/// Derive the stored summary from strategy content: first non-empty line,
/// HTML tags stripped, truncated to 200 characters plus an ellipsis.
pub fn summarize(content: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    let stripped = tag_re.replace_all(content, "");

    let first_line = stripped
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    let truncated: String = first_line
        .chars()
        .take(defaults::STRATEGY_SUMMARY_MAX)
        .collect();
    format!("{}...", truncated)
}

/// Strategy generation and editing service.
pub struct StrategyService {
    cases: Arc<dyn CaseRepository>,
    clients: Arc<dyn ClientRepository>,
    documents: Arc<dyn DocumentRepository>,
    strategies: Arc<dyn StrategyRepository>,
    ingest: Arc<dyn IngestBackend>,
    backend: Arc<dyn GenerationBackend>,
}

impl StrategyService {
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        clients: Arc<dyn ClientRepository>,
        documents: Arc<dyn DocumentRepository>,
        strategies: Arc<dyn StrategyRepository>,
        ingest: Arc<dyn IngestBackend>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            cases,
            clients,
            documents,
            strategies,
            ingest,
            backend,
        }
    }

    /// Generate a new strategy version for a case.
    ///
    /// Nothing is persisted unless every earlier step (reads, document text
    /// fetch, model invocation) succeeds; the document text fetch alone may
    /// fall back to database metadata with a recorded warning.
    pub async fn generate(&self, case_id: Uuid, reason: Option<String>) -> Result<CaseStrategy> {
        let case = self.cases.fetch(case_id).await?;
        let client = self.clients.fetch(case.client_id).await?;
        let current = self.strategies.current(case_id).await?;
        let db_documents = self.documents.list_for_case(case_id).await?;

        let (briefs, warning) = match self.ingest.case_documents(case_id, None).await {
            Ok(text) => {
                // Merge backend text stats with database metadata by file name.
                let briefs = text
                    .documents
                    .iter()
                    .map(|backend_doc| {
                        let db_doc = db_documents
                            .iter()
                            .find(|d| d.file_name == backend_doc.filename);
                        DocumentBrief {
                            title: db_doc
                                .map(|d| d.title.clone())
                                .unwrap_or_else(|| backend_doc.filename.clone()),
                            file_name: backend_doc.filename.clone(),
                            category: db_doc.and_then(|d| d.category.clone()),
                            summary: db_doc.and_then(|d| d.description.clone()),
                            chunk_count: Some(backend_doc.chunk_count),
                        }
                    })
                    .collect();
                (briefs, None)
            }
            Err(e) => {
                warn!(
                    subsystem = "workflow",
                    component = "strategy",
                    op = "generate",
                    case_id = %case_id,
                    error_msg = %e,
                    "Document text unavailable, using database metadata only"
                );
                let briefs = db_documents
                    .iter()
                    .map(|d| DocumentBrief {
                        title: d.title.clone(),
                        file_name: d.file_name.clone(),
                        category: d.category.clone(),
                        summary: d.description.clone(),
                        chunk_count: None,
                    })
                    .collect();
                (briefs, Some(CONTENT_UNAVAILABLE_WARNING.to_string()))
            }
        };

        let reason = reason.unwrap_or_else(|| defaults::DEFAULT_GENERATION_REASON.to_string());
        let context = StrategyContext {
            case: CaseBrief {
                title: case.title.clone(),
                description: case.description.clone(),
                status: case.status.clone(),
            },
            client: ClientBrief {
                name: client.name.clone(),
                email: client.email.clone(),
            },
            documents: briefs,
            current_strategy: current.as_ref().map(|s| StrategyBrief {
                content: s.content.clone(),
                summary: s.summary.clone(),
                version: s.version,
            }),
            reason: reason.clone(),
        };

        let content = self
            .backend
            .generate(prompts::STRATEGY_SYSTEM, &prompts::strategy_prompt(&context))
            .await?;

        let next_version = current.map(|s| s.version).unwrap_or(0) + 1;
        let documents_analyzed = context.documents.len();
        let provenance = StrategyProvenance::Generated {
            documents_analyzed,
            context,
            warning,
            generated_at: Utc::now(),
        };

        let strategy = self
            .strategies
            .create_version(CreateStrategyVersion {
                case_id,
                version: next_version,
                title: format!("Strategy v{} - {}", next_version, case.title),
                summary: summarize(&content),
                content,
                generation_reason: reason,
                model: self.backend.model_name().to_string(),
                metadata: provenance.to_value(),
            })
            .await?;

        info!(
            subsystem = "workflow",
            component = "strategy",
            op = "generate",
            case_id = %case_id,
            strategy_version = strategy.version,
            result_count = documents_analyzed,
            "Strategy version generated"
        );

        Ok(strategy)
    }

    /// Append a manually edited strategy version, bypassing the model.
    ///
    /// Content is stored byte-identical; the version increment contract is
    /// the same as for generated versions.
    pub async fn edit(&self, case_id: Uuid, input: EditStrategyInput) -> Result<CaseStrategy> {
        let case = self.cases.fetch(case_id).await?;
        let current = self.strategies.current(case_id).await?;
        let next_version = current.map(|s| s.version).unwrap_or(0) + 1;

        let provenance = StrategyProvenance::ManualEdit {
            edited_from: input.previous_version.unwrap_or(next_version - 1),
            content_type: input.content_type,
            edited_at: Utc::now(),
        };

        let strategy = self
            .strategies
            .create_version(CreateStrategyVersion {
                case_id,
                version: next_version,
                title: input
                    .title
                    .unwrap_or_else(|| format!("Strategy v{} - {}", next_version, case.title)),
                summary: summarize(&input.content),
                content: input.content,
                generation_reason: defaults::MANUAL_EDIT_REASON.to_string(),
                model: defaults::MANUAL_EDIT_MODEL.to_string(),
                metadata: provenance.to_value(),
            })
            .await?;

        info!(
            subsystem = "workflow",
            component = "strategy",
            op = "edit",
            case_id = %case_id,
            strategy_version = strategy.version,
            "Manual strategy version saved"
        );

        Ok(strategy)
    }
}
