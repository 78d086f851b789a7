//! In-memory repository and ingestion fakes for workflow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use docket_core::{
    new_v7, Case, CaseFull, CaseNote, CaseRepository, CaseStrategy, CaseSummary, CaseText, Client,
    ClientRepository, CreateCaseRecord, CreateDocumentRequest, CreateStrategyVersion, Document,
    DocumentRepository, DocumentStoredUpdate, Error, FileUpload, IngestBackend, IngestReceipt,
    IngestedDocument, NewCase, Result, ScrapeReceipt, StrategyRepository, StrategyVersionSummary,
    UpdateClientRequest,
};

#[derive(Default)]
struct MemoryState {
    clients: HashMap<Uuid, Client>,
    cases: HashMap<Uuid, Case>,
    documents: Vec<Document>,
    strategies: Vec<CaseStrategy>,
    case_sequence: u32,
}

/// Shared in-memory store implementing every repository trait.
#[derive(Clone, Default)]
pub struct MemoryRepo {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a case (with a fresh client) directly, bypassing intake.
    pub fn seed_case(&self, title: &str) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        let client_id = new_v7();
        state.clients.insert(
            client_id,
            Client {
                id: client_id,
                name: "Seed Client".to_string(),
                email: Some("seed@example.com".to_string()),
                phone: None,
                address: None,
                metadata: serde_json::json!({}),
                created_at_utc: now,
                updated_at_utc: now,
                updated_by: None,
            },
        );

        let case_id = new_v7();
        state.case_sequence += 1;
        let case_number = format!("CASE-{}-{:04}", now.format("%Y"), state.case_sequence);
        state.cases.insert(
            case_id,
            Case {
                id: case_id,
                case_number,
                title: title.to_string(),
                description: None,
                status: "active".to_string(),
                client_id,
                assigned_to: None,
                metadata: serde_json::json!({}),
                created_at_utc: now,
                updated_at_utc: now,
            },
        );
        case_id
    }

    pub fn case(&self, id: Uuid) -> Option<Case> {
        self.state.lock().unwrap().cases.get(&id).cloned()
    }

    pub fn client(&self, id: Uuid) -> Option<Client> {
        self.state.lock().unwrap().clients.get(&id).cloned()
    }

    pub fn document(&self, id: Uuid) -> Option<Document> {
        self.state
            .lock()
            .unwrap()
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn documents_for(&self, case_id: Uuid) -> Vec<Document> {
        self.state
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.case_id == case_id)
            .cloned()
            .collect()
    }

    pub fn case_count(&self) -> usize {
        self.state.lock().unwrap().cases.len()
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub fn strategy_count(&self, case_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .strategies
            .iter()
            .filter(|s| s.case_id == case_id)
            .count()
    }
}

#[async_trait]
impl ClientRepository for MemoryRepo {
    async fn fetch(&self, id: Uuid) -> Result<Client> {
        self.client(id)
            .ok_or_else(|| Error::NotFound(format!("Client {} not found", id)))
    }

    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<Client> {
        let mut state = self.state.lock().unwrap();
        let client = state
            .clients
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Client {} not found", id)))?;
        client.name = req.name;
        client.email = req.email;
        client.phone = req.phone;
        client.address = req.address;
        client.updated_by = req.updated_by;
        client.updated_at_utc = Utc::now();
        Ok(client.clone())
    }
}

#[async_trait]
impl CaseRepository for MemoryRepo {
    async fn create_with_client(&self, req: CreateCaseRecord) -> Result<NewCase> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        let client_id = new_v7();
        state.clients.insert(
            client_id,
            Client {
                id: client_id,
                name: req.client.name,
                email: req.client.email,
                phone: req.client.phone,
                address: req.client.address,
                metadata: req.client.metadata,
                created_at_utc: now,
                updated_at_utc: now,
                updated_by: None,
            },
        );

        let case_id = new_v7();
        state.case_sequence += 1;
        let case_number = format!("CASE-{}-{:04}", now.format("%Y"), state.case_sequence);
        state.cases.insert(
            case_id,
            Case {
                id: case_id,
                case_number,
                title: req.title,
                description: Some(req.description),
                status: req.status,
                client_id,
                assigned_to: req.assigned_to,
                metadata: req.metadata,
                created_at_utc: now,
                updated_at_utc: now,
            },
        );

        Ok(NewCase { case_id, client_id })
    }

    async fn fetch(&self, id: Uuid) -> Result<Case> {
        self.case(id).ok_or(Error::CaseNotFound(id))
    }

    async fn fetch_full(&self, id: Uuid) -> Result<CaseFull> {
        let case = self.case(id).ok_or(Error::CaseNotFound(id))?;
        let client = self.client(case.client_id).ok_or_else(|| {
            Error::NotFound(format!("Client {} not found", case.client_id))
        })?;
        let state = self.state.lock().unwrap();
        let mut strategies: Vec<StrategyVersionSummary> = state
            .strategies
            .iter()
            .filter(|s| s.case_id == id)
            .map(|s| StrategyVersionSummary {
                id: s.id,
                version: s.version,
                title: s.title.clone(),
                summary: s.summary.clone(),
                generation_reason: s.generation_reason.clone(),
                model: s.model.clone(),
                created_at_utc: s.created_at_utc,
            })
            .collect();
        strategies.sort_by(|a, b| b.version.cmp(&a.version));

        Ok(CaseFull {
            documents: state
                .documents
                .iter()
                .filter(|d| d.case_id == id)
                .cloned()
                .collect(),
            notes: Vec::<CaseNote>::new(),
            strategies,
            case,
            client,
        })
    }

    async fn list(&self) -> Result<Vec<CaseSummary>> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<CaseSummary> = state
            .cases
            .values()
            .map(|c| CaseSummary {
                id: c.id,
                title: c.title.clone(),
                case_number: c.case_number.clone(),
                status: c.status.clone(),
                client_name: state
                    .clients
                    .get(&c.client_id)
                    .map(|cl| cl.name.clone())
                    .unwrap_or_default(),
                created_at_utc: c.created_at_utc,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
        Ok(summaries)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.case(id).is_some())
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepo {
    async fn create(&self, req: CreateDocumentRequest) -> Result<Uuid> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let id = new_v7();
        state.documents.push(Document {
            id,
            case_id: req.case_id,
            title: req.title,
            description: req.description,
            file_name: req.file_name,
            file_url: req.file_url,
            file_size: req.file_size,
            mime_type: req.mime_type,
            storage_bucket: None,
            storage_key: None,
            category: req.category,
            category_rationale: req.category_rationale,
            metadata: req.metadata,
            created_at_utc: now,
            updated_at_utc: now,
        });
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        self.document(id).ok_or(Error::DocumentNotFound(id))
    }

    async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<Document>> {
        Ok(self.documents_for(case_id))
    }

    async fn mark_stored(&self, id: Uuid, update: DocumentStoredUpdate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DocumentNotFound(id))?;
        doc.file_url = update.file_url;
        doc.storage_bucket = update.storage_bucket;
        doc.storage_key = update.storage_key;
        if update.file_size.is_some() {
            doc.file_size = update.file_size;
        }
        doc.metadata = update.metadata;
        doc.updated_at_utc = Utc::now();
        Ok(())
    }

    async fn update_metadata(&self, id: Uuid, metadata: JsonValue) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DocumentNotFound(id))?;
        doc.metadata = metadata;
        doc.updated_at_utc = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl StrategyRepository for MemoryRepo {
    async fn current(&self, case_id: Uuid) -> Result<Option<CaseStrategy>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .strategies
            .iter()
            .filter(|s| s.case_id == case_id)
            .max_by_key(|s| s.version)
            .cloned())
    }

    async fn create_version(&self, req: CreateStrategyVersion) -> Result<CaseStrategy> {
        let mut state = self.state.lock().unwrap();
        if state
            .strategies
            .iter()
            .any(|s| s.case_id == req.case_id && s.version == req.version)
        {
            return Err(Error::Internal(format!(
                "Version {} already exists for case {}",
                req.version, req.case_id
            )));
        }
        let strategy = CaseStrategy {
            id: new_v7(),
            case_id: req.case_id,
            version: req.version,
            title: req.title,
            content: req.content,
            summary: req.summary,
            generation_reason: req.generation_reason,
            model: req.model,
            metadata: req.metadata,
            created_at_utc: Utc::now(),
        };
        state.strategies.push(strategy.clone());
        Ok(strategy)
    }

    async fn list_versions(&self, case_id: Uuid) -> Result<Vec<StrategyVersionSummary>> {
        let state = self.state.lock().unwrap();
        let mut versions: Vec<StrategyVersionSummary> = state
            .strategies
            .iter()
            .filter(|s| s.case_id == case_id)
            .map(|s| StrategyVersionSummary {
                id: s.id,
                version: s.version,
                title: s.title.clone(),
                summary: s.summary.clone(),
                generation_reason: s.generation_reason.clone(),
                model: s.model.clone(),
                created_at_utc: s.created_at_utc,
            })
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn get_version(&self, case_id: Uuid, version: i32) -> Result<Option<CaseStrategy>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .strategies
            .iter()
            .find(|s| s.case_id == case_id && s.version == version)
            .cloned())
    }
}

#[derive(Default)]
struct FakeIngestState {
    fail_upload_for: Vec<String>,
    fail_documents: bool,
    upload_count: usize,
    scrape_count: usize,
}

/// Configurable ingestion backend fake.
#[derive(Clone, Default)]
pub struct FakeIngest {
    state: Arc<Mutex<FakeIngestState>>,
}

impl FakeIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads for files with this name.
    pub fn fail_upload_for(self, file_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_upload_for
            .push(file_name.to_string());
        self
    }

    /// Fail the case-documents text fetch.
    pub fn fail_documents(self) -> Self {
        self.state.lock().unwrap().fail_documents = true;
        self
    }

    pub fn upload_count(&self) -> usize {
        self.state.lock().unwrap().upload_count
    }

    pub fn scrape_count(&self) -> usize {
        self.state.lock().unwrap().scrape_count
    }
}

#[async_trait]
impl IngestBackend for FakeIngest {
    async fn upload(
        &self,
        file: &FileUpload,
        case_id: Uuid,
        _document_id: Option<Uuid>,
    ) -> Result<IngestReceipt> {
        let mut state = self.state.lock().unwrap();
        state.upload_count += 1;
        if state.fail_upload_for.contains(&file.file_name) {
            return Err(Error::Ingest(format!("upload failed: {}", file.file_name)));
        }
        Ok(IngestReceipt {
            file_url: Some(format!("https://storage.example.com/{}", file.file_name)),
            bucket: Some("test-bucket".to_string()),
            key: Some(format!("cases/{}/{}", case_id, file.file_name)),
            chunks_created: 3,
            documents_processed: 1,
            warning: None,
        })
    }

    async fn scrape_and_upload(
        &self,
        url: &str,
        _case_id: Uuid,
        _fetch_content: bool,
        _document_id: Option<Uuid>,
    ) -> Result<ScrapeReceipt> {
        self.state.lock().unwrap().scrape_count += 1;
        Ok(ScrapeReceipt {
            url: url.to_string(),
            storage_url: Some("https://storage.example.com/scraped.md".to_string()),
            content_size: Some(2048),
            chunks_created: 2,
            documents_processed: 1,
            warning: None,
        })
    }

    async fn case_documents(&self, case_id: Uuid, _document_id: Option<Uuid>) -> Result<CaseText> {
        if self.state.lock().unwrap().fail_documents {
            return Err(Error::Ingest("backend unavailable".to_string()));
        }
        Ok(CaseText {
            case_id: case_id.to_string(),
            total_documents: 1,
            documents: vec![IngestedDocument {
                filename: "a.pdf".to_string(),
                content: "Name: Jane Roe".to_string(),
                chunk_count: 3,
                upload_timestamp: Utc::now().to_rfc3339(),
                case_document_id: None,
            }],
            markdown_content: "# a.pdf\nName: Jane Roe".to_string(),
        })
    }
}
