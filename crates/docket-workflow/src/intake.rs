//! Case-creation workflow: validate extraction output, derive client contact
//! details, and persist client + case in one transaction.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use docket_core::{
    defaults, CaseProvenance, CaseRepository, ClientProvenance, CreateCaseInput, CreateCaseRecord,
    Error, ExtractedField, NewCase, NewClientRecord, Result,
};

/// Client contact details derived from extracted fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Derive client contact details by bucketing extracted field names.
///
/// Case-insensitive substring match against buckets in fixed order:
/// name/client, email, phone/mobile/tel, address/location. Within a bucket
/// the last matching field wins (fields are applied in input order).
pub fn extract_client_info(fields: &[ExtractedField]) -> ClientContact {
    let mut contact = ClientContact::default();

    for field in fields {
        let name = field.field_name.to_lowercase();

        if name.contains("name") || name.contains("client") {
            contact.name = Some(field.field_value.clone());
        } else if name.contains("email") {
            contact.email = Some(field.field_value.clone());
        } else if name.contains("phone") || name.contains("mobile") || name.contains("tel") {
            contact.phone = Some(field.field_value.clone());
        } else if name.contains("address") || name.contains("location") {
            contact.address = Some(field.field_value.clone());
        }
    }

    contact
}

/// Validate intake input, collecting every failing field into one error.
fn validate(input: &CreateCaseInput) -> Result<()> {
    let mut problems = Vec::new();

    if input.case_title.trim().is_empty() {
        problems.push("case_title must not be empty".to_string());
    }
    if input.case_title.chars().count() > defaults::CASE_TITLE_MAX {
        problems.push(format!(
            "case_title must be at most {} characters",
            defaults::CASE_TITLE_MAX
        ));
    }
    if input.document_category.trim().is_empty() {
        problems.push("document_category must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(problems.join(", ")))
    }
}

/// Case intake service.
pub struct IntakeService {
    cases: Arc<dyn CaseRepository>,
}

impl IntakeService {
    pub fn new(cases: Arc<dyn CaseRepository>) -> Self {
        Self { cases }
    }

    /// Create a client and case from AI extraction output.
    ///
    /// Validation happens before any persistence call; the client row, the
    /// generated case number, and the case row are committed atomically.
    pub async fn create_case(&self, input: CreateCaseInput) -> Result<NewCase> {
        validate(&input)?;

        let contact = extract_client_info(&input.extracted_fields);
        let now = Utc::now();

        let client_metadata = serde_json::to_value(ClientProvenance {
            source: "ai_extraction".to_string(),
            extracted_fields: input.extracted_fields.clone(),
            extracted_at: now,
        })?;

        let case_metadata = serde_json::to_value(CaseProvenance {
            document_category: input.document_category.clone(),
            category_rationale: input.category_rationale.clone(),
            extracted_fields: input.extracted_fields.clone(),
            categories: input.categories.clone(),
            extracted_at: now,
        })?;

        let record = CreateCaseRecord {
            title: input.case_title.clone(),
            description: format!(
                "Case created from AI document analysis. Primary document category: {}",
                input.document_category
            ),
            status: defaults::DEFAULT_CASE_STATUS.to_string(),
            assigned_to: input.assigned_to.clone(),
            metadata: case_metadata,
            client: NewClientRecord {
                name: contact
                    .name
                    .unwrap_or_else(|| defaults::DEFAULT_CLIENT_NAME.to_string()),
                email: contact.email,
                phone: contact.phone,
                address: contact.address,
                metadata: client_metadata,
            },
        };

        let new_case = self.cases.create_with_client(record).await?;

        info!(
            subsystem = "workflow",
            component = "intake",
            op = "create_case",
            case_id = %new_case.case_id,
            client_id = %new_case.client_id,
            field_count = input.extracted_fields.len(),
            "Case created from extraction"
        );

        Ok(new_case)
    }
}
