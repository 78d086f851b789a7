//! Document extraction: routes a raw file to the generation backend by MIME
//! type and parses the structured result.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info};

use docket_core::{
    DocumentPayload, Error, ExtractedDetails, ExtractionBackend, GenerationBackend,
    MediaAttachment, Result,
};

use crate::prompts::{EXTRACTION_SYSTEM, EXTRACTION_USER};

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extraction service over a multimodal generation backend.
///
/// MIME routing:
/// - `image/*` and `application/pdf` are attached as media
/// - DOCX/XLSX are rejected before any model call (no parser for them)
/// - everything else is decoded as UTF-8 text and inlined into the prompt
pub struct Extractor {
    backend: Arc<dyn GenerationBackend>,
}

impl Extractor {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ExtractionBackend for Extractor {
    async fn extract(&self, payload: &DocumentPayload) -> Result<ExtractedDetails> {
        let mime = payload.mime_type.as_str();

        debug!(
            subsystem = "inference",
            component = "extractor",
            op = "extract",
            file_name = %payload.name,
            mime_type = %mime,
            file_size = payload.data.len(),
            "Extracting document details"
        );

        if mime == DOCX_MIME || mime == XLSX_MIME {
            return Err(Error::Extraction(format!(
                "File type {} is not supported. Please use PDF or image files.",
                mime
            )));
        }

        let response = if mime.starts_with("image/") || mime == "application/pdf" {
            let attachment = MediaAttachment {
                media_type: mime.to_string(),
                data_base64: BASE64.encode(&payload.data),
            };
            self.backend
                .generate_with_attachment(EXTRACTION_SYSTEM, EXTRACTION_USER, &attachment)
                .await?
        } else {
            let text = String::from_utf8_lossy(&payload.data);
            let prompt = format!("{}\n\nDocument content:\n{}", EXTRACTION_USER, text);
            self.backend.generate(EXTRACTION_SYSTEM, &prompt).await?
        };

        let details = parse_extraction(&response)?;

        info!(
            subsystem = "inference",
            component = "extractor",
            op = "extract",
            file_name = %payload.name,
            category = %details.document_category,
            field_count = details.extracted_fields.len(),
            "Extraction complete"
        );

        Ok(details)
    }
}

/// Parse the model's response into [`ExtractedDetails`], tolerating code
/// fences and surrounding prose.
pub fn parse_extraction(response: &str) -> Result<ExtractedDetails> {
    let json = extract_json_object(response).ok_or_else(|| {
        Error::Extraction("Model response contained no JSON object".to_string())
    })?;

    serde_json::from_str(json)
        .map_err(|e| Error::Extraction(format!("Failed to parse extraction result: {}", e)))
}

/// Locate the JSON object in a model response: prefer a fenced code block,
/// otherwise take the first `{` through the last `}`.
fn extract_json_object(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    let inner = if let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        rest.strip_suffix("```").unwrap_or(rest)
    } else {
        trimmed
    };

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&inner[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;

    const SAMPLE_JSON: &str = r#"{
        "case_title": "Jane Roe - O-1 Petition",
        "document_category": "Identity",
        "category_rationale": "The document is a passport.",
        "extracted_fields": [
            {"field_name": "firstName", "field_value": "Jane", "label": "First Name"}
        ]
    }"#;

    fn pdf_payload() -> DocumentPayload {
        DocumentPayload {
            name: "passport.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            data: b"%PDF-1.4 fake".to_vec(),
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let details = parse_extraction(SAMPLE_JSON).unwrap();
        assert_eq!(details.case_title, "Jane Roe - O-1 Petition");
        assert_eq!(details.document_category, "Identity");
        assert_eq!(details.extracted_fields.len(), 1);
        assert_eq!(details.extracted_fields[0].field_name, "firstName");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", SAMPLE_JSON);
        let details = parse_extraction(&fenced).unwrap();
        assert_eq!(details.document_category, "Identity");
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let noisy = format!("Here is the result:\n{}\nLet me know if you need more.", SAMPLE_JSON);
        let details = parse_extraction(&noisy).unwrap();
        assert_eq!(details.case_title, "Jane Roe - O-1 Petition");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_extraction("I could not read the document.").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[tokio::test]
    async fn test_docx_rejected_before_model_call() {
        let backend = Arc::new(MockGenerationBackend::new());
        let extractor = Extractor::new(backend.clone());

        let payload = DocumentPayload {
            name: "resume.docx".to_string(),
            mime_type: DOCX_MIME.to_string(),
            data: vec![0x50, 0x4b],
        };

        let err = extractor.extract(&payload).await.unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert!(err.to_string().contains(DOCX_MIME));
        assert_eq!(backend.calls().len(), 0, "backend must not be called");
    }

    #[tokio::test]
    async fn test_xlsx_rejected_before_model_call() {
        let backend = Arc::new(MockGenerationBackend::new());
        let extractor = Extractor::new(backend.clone());

        let payload = DocumentPayload {
            name: "ledger.xlsx".to_string(),
            mime_type: XLSX_MIME.to_string(),
            data: vec![0x50, 0x4b],
        };

        assert!(extractor.extract(&payload).await.is_err());
        assert_eq!(backend.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_pdf_goes_through_attachment_path() {
        let backend = Arc::new(MockGenerationBackend::new().with_fixed_response(SAMPLE_JSON));
        let extractor = Extractor::new(backend.clone());

        let details = extractor.extract(&pdf_payload()).await.unwrap();
        assert_eq!(details.document_category, "Identity");

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "generate_with_attachment");
        assert_eq!(calls[0].media_type.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_text_file_inlined_into_prompt() {
        let backend = Arc::new(MockGenerationBackend::new().with_fixed_response(SAMPLE_JSON));
        let extractor = Extractor::new(backend.clone());

        let payload = DocumentPayload {
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            data: b"Client: Jane Roe".to_vec(),
        };

        extractor.extract(&payload).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0].operation, "generate");
        assert!(calls[0].prompt.contains("Client: Jane Roe"));
    }
}
