//! # docket-ingest
//!
//! HTTP client for the external ingestion backend, which owns durable file
//! storage and text chunking. The backend exposes three endpoints:
//!
//! - `POST /upload`: multipart file upload, keyed by case and document id
//! - `POST /scrape`: fetch a URL's content server-side and ingest it
//! - `GET /documents`: full text of a case's ingested documents
//!
//! Errors from the backend arrive as `{"detail": "..."}` JSON bodies; those
//! are surfaced verbatim so the caller sees the backend's own message.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use docket_core::{
    defaults, CaseText, Error, FileUpload, IngestBackend, IngestReceipt, IngestedDocument, Result,
    ScrapeReceipt,
};

/// Environment variable for the ingestion backend base URL.
pub const ENV_BASE_URL: &str = "INGEST_BASE_URL";

/// Configuration for [`IngestClient`].
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Base URL of the ingestion backend, without a trailing slash.
    pub base_url: String,
    /// Request timeout. Uploads can carry multi-megabyte files.
    pub timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::INGEST_URL.to_string(),
            timeout: Duration::from_secs(defaults::INGEST_TIMEOUT_SECS),
        }
    }
}

impl IngestConfig {
    /// Build from environment, falling back to defaults:
    /// - `INGEST_BASE_URL` (default `http://localhost:8000`)
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_BASE_URL)
            .unwrap_or_else(|_| defaults::INGEST_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            base_url,
            ..Self::default()
        }
    }
}

/// Reqwest-backed client for the ingestion backend.
pub struct IngestClient {
    client: reqwest::Client,
    config: IngestConfig,
}

// Wire shapes. Fields default individually so a backend that omits optional
// stats still deserializes.

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    s3_url: Option<String>,
    #[serde(default)]
    s3_bucket: Option<String>,
    #[serde(default)]
    s3_key: Option<String>,
    #[serde(default)]
    chunks_created: i64,
    #[serde(default)]
    documents_processed: i64,
    #[serde(default)]
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    url: String,
    #[serde(default)]
    s3_url: Option<String>,
    #[serde(default)]
    content_size: Option<i64>,
    #[serde(default)]
    chunks_created: i64,
    #[serde(default)]
    documents_processed: i64,
    #[serde(default)]
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentEntry {
    filename: String,
    content: String,
    #[serde(default)]
    chunk_count: i64,
    #[serde(default)]
    upload_timestamp: String,
    #[serde(default)]
    case_document_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    case_id: String,
    #[serde(default)]
    total_documents: i64,
    #[serde(default)]
    documents: Vec<DocumentEntry>,
    #[serde(default)]
    markdown_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl IngestClient {
    /// Create a client with explicit configuration.
    pub fn new(config: IngestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(IngestConfig::from_env())
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Turn a non-2xx response into an [`Error::Ingest`], preferring the
    /// backend's own `{"detail": ...}` message over the raw body.
    async fn error_from_response(op: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorDetail>(&body) {
            Ok(parsed) => parsed.detail,
            Err(_) => format!("HTTP {}: {}", status.as_u16(), body),
        };

        Error::Ingest(format!("{} failed: {}", op, message))
    }
}

#[async_trait]
impl IngestBackend for IngestClient {
    async fn upload(
        &self,
        file: &FileUpload,
        case_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<IngestReceipt> {
        let start = Instant::now();
        debug!(
            subsystem = "ingest",
            component = "client",
            op = "upload",
            case_id = %case_id,
            file_name = %file.file_name,
            file_size = file.data.len(),
            "Uploading file to ingestion backend"
        );

        let mut part = multipart::Part::bytes(file.data.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| Error::Ingest(format!("Invalid MIME type '{}': {}", mime, e)))?;
        }

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("case_id", case_id.to_string());
        if let Some(doc_id) = document_id {
            form = form.text("case_document_id", doc_id.to_string());
        }

        let response = self
            .client
            .post(format!("{}/upload", self.config.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Ingest(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("Upload", response).await);
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Ingest(format!("Invalid upload response: {}", e)))?;

        info!(
            subsystem = "ingest",
            component = "client",
            op = "upload",
            case_id = %case_id,
            file_name = %file.file_name,
            chunk_count = parsed.chunks_created,
            duration_ms = start.elapsed().as_millis() as u64,
            "File ingested"
        );

        Ok(IngestReceipt {
            file_url: parsed.s3_url,
            bucket: parsed.s3_bucket,
            key: parsed.s3_key,
            chunks_created: parsed.chunks_created,
            documents_processed: parsed.documents_processed,
            warning: parsed.warning,
        })
    }

    async fn scrape_and_upload(
        &self,
        url: &str,
        case_id: Uuid,
        fetch_content: bool,
        document_id: Option<Uuid>,
    ) -> Result<ScrapeReceipt> {
        let start = Instant::now();
        debug!(
            subsystem = "ingest",
            component = "client",
            op = "scrape",
            case_id = %case_id,
            url = %url,
            fetch_content,
            "Scraping URL via ingestion backend"
        );

        let mut body = serde_json::json!({
            "url": url,
            "case_id": case_id.to_string(),
            "fetch_content": fetch_content,
        });
        if let Some(doc_id) = document_id {
            body["case_document_id"] = serde_json::json!(doc_id.to_string());
        }

        let response = self
            .client
            .post(format!("{}/scrape", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Ingest(format!("Scrape request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("Scrape", response).await);
        }

        let parsed: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| Error::Ingest(format!("Invalid scrape response: {}", e)))?;

        info!(
            subsystem = "ingest",
            component = "client",
            op = "scrape",
            case_id = %case_id,
            url = %parsed.url,
            chunk_count = parsed.chunks_created,
            duration_ms = start.elapsed().as_millis() as u64,
            "URL ingested"
        );

        Ok(ScrapeReceipt {
            url: parsed.url,
            storage_url: parsed.s3_url,
            content_size: parsed.content_size,
            chunks_created: parsed.chunks_created,
            documents_processed: parsed.documents_processed,
            warning: parsed.warning,
        })
    }

    async fn case_documents(&self, case_id: Uuid, document_id: Option<Uuid>) -> Result<CaseText> {
        debug!(
            subsystem = "ingest",
            component = "client",
            op = "case_documents",
            case_id = %case_id,
            "Fetching ingested document text"
        );

        let mut request = self
            .client
            .get(format!("{}/documents", self.config.base_url))
            .query(&[("case_id", case_id.to_string())]);
        if let Some(doc_id) = document_id {
            request = request.query(&[("case_document_id", doc_id.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Ingest(format!("Documents request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("Documents fetch", response).await);
        }

        let parsed: DocumentsResponse = response
            .json()
            .await
            .map_err(|e| Error::Ingest(format!("Invalid documents response: {}", e)))?;

        debug!(
            subsystem = "ingest",
            component = "client",
            op = "case_documents",
            case_id = %case_id,
            result_count = parsed.documents.len(),
            "Fetched ingested document text"
        );

        Ok(CaseText {
            case_id: parsed.case_id,
            total_documents: parsed.total_documents,
            documents: parsed
                .documents
                .into_iter()
                .map(|d| IngestedDocument {
                    filename: d.filename,
                    content: d.content,
                    chunk_count: d.chunk_count,
                    upload_timestamp: d.upload_timestamp,
                    case_document_id: d.case_document_id,
                })
                .collect(),
            markdown_content: parsed.markdown_content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::new_v7;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> IngestClient {
        IngestClient::new(IngestConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn sample_file() -> FileUpload {
        FileUpload {
            file_name: "passport.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
            data: b"%PDF-1.4 fake".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_maps_receipt_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "filename": "passport.pdf",
                "s3_url": "https://bucket.s3.amazonaws.com/cases/x/passport.pdf",
                "s3_bucket": "bucket",
                "s3_key": "cases/x/passport.pdf",
                "chunks_created": 7,
                "documents_processed": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let receipt = client.upload(&sample_file(), new_v7(), Some(new_v7())).await.unwrap();

        assert_eq!(
            receipt.file_url.as_deref(),
            Some("https://bucket.s3.amazonaws.com/cases/x/passport.pdf")
        );
        assert_eq!(receipt.bucket.as_deref(), Some("bucket"));
        assert_eq!(receipt.chunks_created, 7);
        assert_eq!(receipt.documents_processed, 1);
        assert!(receipt.warning.is_none());
    }

    #[tokio::test]
    async fn test_upload_surfaces_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "detail": "Unsupported file type"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.upload(&sample_file(), new_v7(), None).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Unsupported file type"), "got: {}", msg);
    }

    #[tokio::test]
    async fn test_upload_non_json_error_includes_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.upload(&sample_file(), new_v7(), None).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("503"), "got: {}", msg);
        assert!(msg.contains("upstream down"), "got: {}", msg);
    }

    #[tokio::test]
    async fn test_scrape_maps_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://example.com/notice",
                "s3_url": "https://bucket.s3.amazonaws.com/scraped/notice.md",
                "content_size": 4096,
                "chunks_created": 3,
                "documents_processed": 1,
                "warning": "Truncated at 1MB"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let receipt = client
            .scrape_and_upload("https://example.com/notice", new_v7(), true, None)
            .await
            .unwrap();

        assert_eq!(receipt.url, "https://example.com/notice");
        assert_eq!(receipt.content_size, Some(4096));
        assert_eq!(receipt.chunks_created, 3);
        assert_eq!(receipt.warning.as_deref(), Some("Truncated at 1MB"));
    }

    #[tokio::test]
    async fn test_case_documents_query_and_mapping() {
        let case_id = new_v7();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("case_id", case_id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "case_id": case_id.to_string(),
                "total_documents": 2,
                "documents": [
                    {
                        "filename": "passport.pdf",
                        "content": "Name: Jane Roe",
                        "chunk_count": 2,
                        "upload_timestamp": "2026-08-01T12:00:00Z"
                    },
                    {
                        "filename": "lease.pdf",
                        "content": "Lease agreement",
                        "chunk_count": 4,
                        "upload_timestamp": "2026-08-02T09:30:00Z",
                        "case_document_id": "abc"
                    }
                ],
                "markdown_content": "# passport.pdf\nName: Jane Roe\n# lease.pdf\nLease agreement"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.case_documents(case_id, None).await.unwrap();

        assert_eq!(text.total_documents, 2);
        assert_eq!(text.documents.len(), 2);
        assert_eq!(text.documents[0].filename, "passport.pdf");
        assert_eq!(text.documents[1].case_document_id.as_deref(), Some("abc"));
        assert!(text.markdown_content.contains("Lease agreement"));
    }

    #[tokio::test]
    async fn test_documents_error_is_ingest_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "No documents found for case"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.case_documents(new_v7(), None).await.unwrap_err();

        assert!(matches!(err, Error::Ingest(_)));
        assert!(err.to_string().contains("No documents found"));
    }

    #[test]
    fn test_config_default_points_at_localhost() {
        let config = IngestConfig::default();
        assert_eq!(config.base_url, defaults::INGEST_URL);
        assert_eq!(config.timeout.as_secs(), defaults::INGEST_TIMEOUT_SECS);
    }
}
